//! Diagnostic knowledge base
//!
//! Maps every `FailureClass` to the reference text (indicators, causes and
//! solutions) that grounds an explanation. The table is built once, either
//! from the built-in entries or from an operator-supplied TOML file, and is
//! never mutated afterwards. Share it behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReasoningError, Result};

/// Categorical diagnosis for an oil/equipment condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    MachineDepreciation,
    WaterContamination,
    DirtInOil,
    SludgeFormation,
    OilChangeNeeded,
    Normal,
}

impl FailureClass {
    /// Every class the classifier can produce
    pub const ALL: [FailureClass; 6] = [
        FailureClass::MachineDepreciation,
        FailureClass::WaterContamination,
        FailureClass::DirtInOil,
        FailureClass::SludgeFormation,
        FailureClass::OilChangeNeeded,
        FailureClass::Normal,
    ];

    /// The snake_case label used by the classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::MachineDepreciation => "machine_depreciation",
            FailureClass::WaterContamination => "water_contamination",
            FailureClass::DirtInOil => "dirt_in_oil",
            FailureClass::SludgeFormation => "sludge_formation",
            FailureClass::OilChangeNeeded => "oil_change_needed",
            FailureClass::Normal => "normal",
        }
    }

    fn index(&self) -> usize {
        match self {
            FailureClass::MachineDepreciation => 0,
            FailureClass::WaterContamination => 1,
            FailureClass::DirtInOil => 2,
            FailureClass::SludgeFormation => 3,
            FailureClass::OilChangeNeeded => 4,
            FailureClass::Normal => 5,
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureClass {
    type Err = ReasoningError;

    fn from_str(label: &str) -> Result<Self> {
        FailureClass::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == label)
            .ok_or_else(|| ReasoningError::unknown_class(label))
    }
}

/// Reference text for one failure class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticKnowledge {
    class: FailureClass,
    indicators: Vec<String>,
    causes: Vec<String>,
    solutions: Vec<String>,
    text: String,
}

impl DiagnosticKnowledge {
    fn new(
        class: FailureClass,
        indicators: Vec<String>,
        causes: Vec<String>,
        solutions: Vec<String>,
    ) -> Result<Self> {
        for (section, items) in [
            ("indicators", &indicators),
            ("causes", &causes),
            ("solutions", &solutions),
        ] {
            if items.is_empty() || items.iter().any(|item| item.trim().is_empty()) {
                return Err(ReasoningError::configuration(format!(
                    "Knowledge for {} has an empty {} section",
                    class, section
                )));
            }
        }

        let text = render_sections(&indicators, &causes, &solutions);
        Ok(Self {
            class,
            indicators,
            causes,
            solutions,
            text,
        })
    }

    /// The class this entry describes
    pub fn class(&self) -> FailureClass {
        self.class
    }

    /// Observable indicators supporting the diagnosis
    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    /// Likely causes to investigate
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Recommended solutions
    pub fn solutions(&self) -> &[String] {
        &self.solutions
    }

    /// The full retrieval text, as fed to the prompt
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DiagnosticKnowledge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render_sections(indicators: &[String], causes: &[String], solutions: &[String]) -> String {
    let mut text = String::new();
    for (header, items) in [
        ("Indicators", indicators),
        ("Causes", causes),
        ("Solutions", solutions),
    ] {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(header);
        text.push(':');
        for item in items {
            text.push_str("\n• ");
            text.push_str(item.trim());
        }
    }
    text
}

/// One class table in a knowledge override file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KnowledgeEntry {
    indicators: Vec<String>,
    causes: Vec<String>,
    solutions: Vec<String>,
}

/// Immutable class → knowledge table
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    // Indexed by FailureClass::index; complete by construction.
    entries: Vec<DiagnosticKnowledge>,
}

impl KnowledgeBase {
    /// The built-in knowledge table
    pub fn builtin() -> Self {
        let entries = FailureClass::ALL
            .iter()
            .map(|class| {
                let (indicators, causes, solutions) = builtin_entry(*class);
                let (indicators, causes, solutions) =
                    (to_owned(indicators), to_owned(causes), to_owned(solutions));
                let text = render_sections(&indicators, &causes, &solutions);
                DiagnosticKnowledge {
                    class: *class,
                    indicators,
                    causes,
                    solutions,
                    text,
                }
            })
            .collect();

        Self { entries }
    }

    /// Parse a knowledge table from TOML
    ///
    /// The document must contain one table per failure class, each with
    /// non-empty `indicators`, `causes` and `solutions` arrays.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: HashMap<String, KnowledgeEntry> = toml::from_str(source).map_err(|e| {
            ReasoningError::configuration(format!("Invalid knowledge table: {}", e))
        })?;

        let mut by_class: HashMap<FailureClass, KnowledgeEntry> = HashMap::new();
        for (label, entry) in raw {
            let class = label.parse::<FailureClass>().map_err(|_| {
                ReasoningError::configuration(format!(
                    "Knowledge table names an unknown failure class: {}",
                    label
                ))
            })?;
            by_class.insert(class, entry);
        }

        let mut entries = Vec::with_capacity(FailureClass::ALL.len());
        for class in FailureClass::ALL {
            let entry = by_class.remove(&class).ok_or_else(|| {
                ReasoningError::configuration(format!(
                    "Knowledge table is missing failure class: {}",
                    class
                ))
            })?;
            entries.push(DiagnosticKnowledge::new(
                class,
                entry.indicators,
                entry.causes,
                entry.solutions,
            )?);
        }

        log::info!("Loaded knowledge table for {} failure classes", entries.len());
        Ok(Self { entries })
    }

    /// Read and parse a knowledge table file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ReasoningError::configuration(format!(
                "Failed to read knowledge table {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&source)
    }

    /// Look up the knowledge for a predicted class label
    pub fn lookup(&self, label: &str) -> Result<&DiagnosticKnowledge> {
        let class = label.parse::<FailureClass>()?;
        Ok(self.get(class))
    }

    /// Typed access; every class is present
    pub fn get(&self, class: FailureClass) -> &DiagnosticKnowledge {
        &self.entries[class.index()]
    }

    /// Iterate over all entries in class order
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticKnowledge> {
        self.entries.iter()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

type Sections = (&'static [&'static str], &'static [&'static str], &'static [&'static str]);

fn builtin_entry(class: FailureClass) -> Sections {
    match class {
        FailureClass::MachineDepreciation => (
            &[
                "High levels of wear metals: Fe, Pb, Cu, Sn, Cr, Al",
                "Fe > 30 ppm → gear wear",
                "Pb > 30 ppm → bearing overlay wear",
                "Cu/Sn > 20/10 ppm → bushing wear",
                "Cr/Al > 5–10 ppm → piston ring/liner damage",
            ],
            &[
                "Poor lubrication (oil degradation or wrong viscosity)",
                "Misalignment or overloading",
                "Extended oil drain intervals",
                "Contamination by hard particles or coolant",
            ],
            &[
                "Reduce oil drain interval or use condition-based oil change",
                "Use higher-grade anti-wear or EP (extreme pressure) oil",
                "Inspect and replace worn components (bearings, bushings)",
                "Monitor wear rate over time to distinguish break-in vs. failure",
            ],
        ),
        FailureClass::WaterContamination => (
            &[
                "Water = Yes, Water > 0.1%",
                "Na > 50 ppm (from coolant)",
                "B < 3 ppm + Na > 30 ppm (coolant dilution)",
                "Rust formation, low dielectric strength",
            ],
            &[
                "Leaking gaskets or seals",
                "Faulty heat exchanger or cracked cylinder liner",
                "Condensation (cold starts, short runs)",
                "Coolant system leaks",
            ],
            &[
                "Identify source via elemental analysis (Na, B, K)",
                "Pressure test cooling system",
                "Replace gaskets or seals",
                "Use water-separating filters or desiccant breathers",
            ],
        ),
        FailureClass::DirtInOil => (
            &[
                "High Si (>10 ppm) + Al > 10 ppm",
                "Si > 5 ppm + B < 5 ppm (no boron additive support)",
                "Elevated Fe or Cr due to abrasive wear",
            ],
            &[
                "Defective or missing air filters",
                "Breathers not sealed properly",
                "Crankcase vacuum leak",
                "Operating in dusty environments",
            ],
            &[
                "Replace/upgrade air filters (check for ISO 5011 spec)",
                "Install high-efficiency or dual-stage filtration",
                "Seal all intake systems",
                "Increase sampling frequency in dusty environments",
            ],
        ),
        FailureClass::SludgeFormation => (
            &[
                "OXI > 20 Abs/cm or TAN > 0.2",
                "Delta Viscosity (V40) > +15%",
                "TBN dropping while TAN rising",
                "Darkened or cloudy oil appearance",
            ],
            &[
                "High operating temperatures (>90–100°C)",
                "Long oil drain intervals",
                "Poor additive package (low oxidation inhibitors)",
                "Overloaded operation or poor cooling",
            ],
            &[
                "Switch to higher oxidation-resistant oil (Group III or PAO)",
                "Install oil coolers or improve ventilation",
                "Reduce drain interval",
                "Use antioxidant additives (phenols, amines)",
            ],
        ),
        FailureClass::OilChangeNeeded => (
            &[
                "TBN < 1.0 → no neutralizing reserve",
                "Delta viscosity > +10–15% (shearing or oxidation)",
                "Zn < 30 ppm, Ca < 100 ppm → detergent/additive depletion",
                "TAN > 0.18 → acid buildup",
                "Change in color, smell, or foam",
            ],
            &[
                "Long oil drain intervals",
                "High thermal or mechanical stress",
                "Contaminants degrading the additives",
            ],
            &[
                "Change oil based on condition, not fixed time (use analytics)",
                "Switch to extended-drain synthetic oil with robust additive package",
            ],
        ),
        FailureClass::Normal => (
            &[
                "All wear metals within normal ranges",
                "TBN & TAN ratios are normal",
                "Stable viscosity",
                "No significant contaminants",
                "Additives present and not depleted",
            ],
            &["No abnormal wear, contamination or degradation mechanism detected"],
            &["Continue scheduled monitoring"],
        ),
    }
}
