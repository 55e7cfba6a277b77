//! Known series identifiers and their registry metadata.
//!
//! Series identifiers are logical keys ("USDARS_PARALLEL"), independent of
//! any provider's internal code. The registry is informational: routing works
//! for any identifier a provider recognises.

use serde::{Deserialize, Serialize};

pub const USDARS_OFFICIAL: &str = "USDARS_OFFICIAL";
pub const USDARS_OFFICIAL_BLUELYTICS: &str = "USDARS_OFFICIAL_BLUELYTICS";
pub const USDARS_PARALLEL: &str = "USDARS_PARALLEL";
pub const USDARS_BLUE: &str = "USDARS_BLUE";
pub const USDARS_RETAIL: &str = "USDARS_RETAIL";
pub const RESERVES_USD: &str = "RESERVES_USD";
pub const CPI_HEADLINE: &str = "CPI_HEADLINE";
pub const CPI_CORE: &str = "CPI_CORE";
pub const CPI_NATIONAL_INDEX: &str = "CPI_NATIONAL_INDEX";
pub const CPI_NATIONAL_YOY: &str = "CPI_NATIONAL_YOY";
pub const CPI_NATIONAL_MOM: &str = "CPI_NATIONAL_MOM";
pub const EMBI_AR: &str = "EMBI_AR";
pub const CDS_ARG_5Y_USD: &str = "CDS_ARG_5Y_USD";
pub const BADLAR_RATE: &str = "BADLAR_RATE";
pub const TM20_RATE: &str = "TM20_RATE";
pub const POLICY_RATE: &str = "POLICY_RATE";

/// Observation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "M")]
    Monthly,
}

impl Frequency {
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Monthly => "M",
        }
    }
}

/// Registry entry for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub freq: Frequency,
    /// Preferred upstream source.
    pub source: &'static str,
    pub units: &'static str,
}

const fn spec(
    code: &'static str,
    name: &'static str,
    freq: Frequency,
    source: &'static str,
    units: &'static str,
) -> SeriesSpec {
    SeriesSpec {
        code,
        name,
        freq,
        source,
        units,
    }
}

static REGISTRY: &[SeriesSpec] = &[
    spec(USDARS_OFFICIAL, "Official wholesale USD/ARS", Frequency::Daily, "BCRA", "ARS per USD"),
    spec(
        USDARS_OFFICIAL_BLUELYTICS,
        "Official USD/ARS (Bluelytics)",
        Frequency::Daily,
        "BLUELYTICS",
        "ARS per USD",
    ),
    spec(USDARS_PARALLEL, "Parallel (blue) USD/ARS", Frequency::Daily, "BLUELYTICS", "ARS per USD (blue)"),
    spec(USDARS_RETAIL, "Retail USD/ARS", Frequency::Daily, "BCRA", "ARS per USD"),
    spec(RESERVES_USD, "Gross international reserves", Frequency::Daily, "BCRA", "USD millions"),
    spec(CPI_HEADLINE, "CPI headline index", Frequency::Monthly, "INDEC", "Index"),
    spec(CPI_CORE, "CPI core index", Frequency::Monthly, "INDEC", "Index"),
    spec(CPI_NATIONAL_INDEX, "National CPI index", Frequency::Monthly, "FRED", "Index"),
    spec(CPI_NATIONAL_YOY, "National CPI year over year", Frequency::Monthly, "FRED", "Percent"),
    spec(CPI_NATIONAL_MOM, "National CPI month over month", Frequency::Monthly, "FRED", "Percent"),
    spec(EMBI_AR, "EMBI Argentina spread", Frequency::Daily, "LOCALCSV", "Basis points"),
    spec(CDS_ARG_5Y_USD, "Argentina 5Y CDS", Frequency::Daily, "LOCALCSV", "Basis points"),
    spec(BADLAR_RATE, "BADLAR private banks rate", Frequency::Daily, "BCRA", "Annualized percentage"),
    spec(TM20_RATE, "TM20 rate", Frequency::Daily, "BCRA", "Annualized percentage"),
    spec(POLICY_RATE, "Monetary policy rate", Frequency::Daily, "BCRA", "Annualized percentage"),
];

/// Look up a series by identifier.
pub fn lookup(code: &str) -> Option<&'static SeriesSpec> {
    REGISTRY.iter().find(|s| s.code == code)
}

/// All registered series, in registry order.
pub fn all() -> &'static [SeriesSpec] {
    REGISTRY
}
