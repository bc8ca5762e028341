use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bank known to the transfer flow.
///
/// The routing code is what the lookup service uses to pick the institution;
/// the remaining fields are display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "code")]
    pub routing_code: String,
    pub logo: String,
    #[serde(rename = "color")]
    pub brand_color: String,
}

impl BankEntry {
    pub fn new(id: &str, display_name: &str, routing_code: &str, logo: &str, brand_color: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            routing_code: routing_code.to_string(),
            logo: logo.to_string(),
            brand_color: brand_color.to_string(),
        }
    }
}

// (id, name, code, logo, color) in probe order.
const BUILTIN_BANKS: &[(&str, &str, &str, &str, &str)] = &[
    // Commercial
    ("1", "Access Bank", "044", "A", "#004a88"),
    ("2", "GTBank", "058", "GT", "#dd4b39"),
    ("3", "Zenith Bank", "070", "Z", "#da291c"),
    ("5", "United Bank for Africa (UBA)", "033", "U", "#cf102d"),
    ("6", "First Bank", "011", "F", "#003b64"),
    ("10", "Stanbic IBTC Bank", "039", "S", "#0033a1"),
    ("13", "Wema Bank", "035", "W", "#9d1a34"),
    ("11", "Fidelity Bank", "070", "FB", "#042d74"),
    ("12", "Ecobank Nigeria", "050", "E", "#005a96"),
    ("14", "FCMB", "214", "FC", "#5c2d91"),
    ("15", "Sterling Bank", "232", "SB", "#e31837"),
    ("16", "Union Bank", "032", "U", "#009fe3"),
    ("17", "Unity Bank", "215", "UB", "#f37021"),
    ("18", "Polaris Bank", "076", "P", "#5a2d81"),
    ("19", "Keystone Bank", "082", "K", "#003399"),
    ("20", "Citibank", "023", "C", "#00448d"),
    ("21", "Standard Chartered", "068", "SC", "#009444"),
    ("22", "Titan Trust Bank", "102", "T", "#003399"),
    ("24", "Globus Bank", "103", "G", "#313335"),
    ("25", "Providus Bank", "101", "PB", "#000000"),
    ("26", "Parallex Bank", "104", "P", "#e60000"),
    ("27", "Premium Trust Bank", "105", "PT", "#004a88"),
    ("28", "Signature Bank", "106", "SB", "#c5a059"),
    ("29", "SunTrust Bank", "100", "ST", "#004a88"),
    ("30", "Optimus Bank", "107", "OB", "#10B981"),
    // Digital & microfinance
    ("4", "Kuda Bank", "50211", "K", "#40196d"),
    ("7", "Opay (Digital)", "999992", "O", "#00b875"),
    ("8", "Moniepoint MFB", "50300", "M", "#003399"),
    ("9", "Palmpay", "999991", "P", "#7a22e0"),
    ("23", "FairMoney MFB", "090551", "FM", "#2b58f6"),
    ("31", "VFD MFB", "566", "V", "#1a1a1a"),
    ("32", "Mint Finex MFB", "50304", "MF", "#10B981"),
    ("33", "Raven Bank", "50325", "R", "#6e3ff3"),
    ("34", "Sparkle Bank", "51310", "S", "#000000"),
    ("35", "Rubies Bank", "125", "RB", "#e91e63"),
    ("36", "Dot Bank", "50162", "D", "#2a2a2a"),
    ("37", "Accion MFB", "602", "AC", "#007dc3"),
    ("38", "Lapo MFB", "504", "L", "#f48221"),
    // Non-interest
    ("39", "Jaiz Bank", "301", "J", "#006837"),
    ("40", "Lotus Bank", "303", "L", "#1e3a8a"),
    ("41", "TAJBank", "302", "T", "#c1272d"),
    ("42", "Alternative Bank", "304", "A", "#000000"),
];

/// Read-only, ordered list of banks.
///
/// Order is the fallback probe order used when the user has not picked a bank.
#[derive(Debug, Clone, PartialEq)]
pub struct BankDirectory {
    entries: Vec<BankEntry>,
}

impl Default for BankDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BankDirectory {
    /// The built-in Nigerian bank list.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_BANKS
                .iter()
                .map(|(id, name, code, logo, color)| BankEntry::new(id, name, code, logo, color))
                .collect(),
        )
    }

    pub fn from_entries(entries: Vec<BankEntry>) -> Self {
        let directory = Self { entries };
        for (code, ids) in directory.shared_routing_codes() {
            tracing::info!(routing_code = %code, ?ids, "routing code shared by several banks");
        }
        directory
    }

    pub fn entries(&self) -> &[BankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&BankEntry> {
        self.entries.iter().find(|bank| bank.id == id)
    }

    /// Case-insensitive substring match on the display name, in directory order.
    pub fn filter(&self, query: &str) -> Vec<&BankEntry> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|bank| bank.display_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Routing codes used by more than one entry, with the ids sharing them.
    pub fn shared_routing_codes(&self) -> BTreeMap<String, Vec<String>> {
        let mut by_code: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for bank in &self.entries {
            by_code
                .entry(bank.routing_code.clone())
                .or_default()
                .push(bank.id.clone());
        }
        by_code.retain(|_, ids| ids.len() > 1);
        by_code
    }
}
