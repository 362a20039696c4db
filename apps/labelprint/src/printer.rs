//! Print-submission profile for the label printer.
//!
//! The layout core never reads this. It is handed, as a plain value, to whatever
//! submits the rendered page to the printer driver.

use serde::Serialize;

/// Driver settings for roll-fed label stock: print as soon as possible, cut after every
/// label, one copy, no banner pages, no scaling.
const ROLL_MEDIA_SETTINGS: &[(&str, &str)] = &[
    ("print-at", "now"),
    ("scale", "100"),
    ("n-copies", "1"),
    ("number-up", "1"),
    ("cups-PrintQuality", "Fast"),
    ("cups-RollFedMedia", "Roll"),
    ("cups-CutMedia", "LabelEnd"),
    ("cups-Align", "Right"),
    ("cups-job-sheets", "none,none"),
    ("cups-MirrorPrint", "False"),
    ("cups-NegativePrint", "False"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterSetting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterProfile {
    pub printer: String,
    pub settings: Vec<PrinterSetting>,
}

impl PrinterProfile {
    pub fn new(printer: String) -> Self {
        Self {
            printer,
            settings: ROLL_MEDIA_SETTINGS
                .iter()
                .map(|(key, value)| PrinterSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.as_str())
    }
}
