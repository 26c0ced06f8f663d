use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

/// Result of writing one label into the `Schema` sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value cell was overwritten
    Updated,
    /// The target sheet does not exist
    SheetMissing,
    /// No row carries the label
    LabelMissing,
}

impl WriteOutcome {
    fn is_updated(&self) -> bool {
        matches!(self, WriteOutcome::Updated)
    }
}

/// Outcome of one field write
#[derive(Debug, Clone)]
pub struct FieldWrite {
    /// Metadata label that was written
    pub label: String,
    /// What happened
    pub outcome: WriteOutcome,
}

/// Summary of a batch of field writes into a template
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    /// Individual write outcomes, in write order
    pub writes: Vec<FieldWrite>,
    /// Sheet the batch targeted
    pub sheet: String,
}

impl WriteReport {
    /// Create an empty report for `sheet`
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            writes: Vec::new(),
            sheet: sheet.into(),
        }
    }

    /// Record one outcome
    pub fn add(&mut self, label: impl Into<String>, outcome: WriteOutcome) {
        self.writes.push(FieldWrite {
            label: label.into(),
            outcome,
        });
    }

    /// Number of labels written
    pub fn updated_count(&self) -> usize {
        self.writes.iter().filter(|w| w.outcome.is_updated()).count()
    }

    /// Labels that could not be placed
    pub fn skipped(&self) -> impl Iterator<Item = &FieldWrite> {
        self.writes.iter().filter(|w| !w.outcome.is_updated())
    }

    /// Whether every label was written
    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static SKIP: Emoji<'_, '_> = Emoji("⚠", "[SKIP]");

            let mut output = String::new();
            output.push_str(&format!(
                "{}\n",
                style(format!("Template fields ({})", self.sheet)).bold().cyan()
            ));
            for write in &self.writes {
                let line = match write.outcome {
                    WriteOutcome::Updated => format!("{} {}", OK, write.label),
                    WriteOutcome::SheetMissing => format!(
                        "{} {}",
                        SKIP,
                        style(format!("{}: sheet not found", write.label)).yellow()
                    ),
                    WriteOutcome::LabelMissing => format!(
                        "{} {}",
                        SKIP,
                        style(format!("{}: label not in template", write.label)).yellow()
                    ),
                };
                output.push_str(&format!("  {}\n", line));
            }
            output.push_str(&format!(
                "\n{} written, {} skipped\n",
                style(self.updated_count()).green(),
                style(self.writes.len() - self.updated_count()).yellow()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template fields ({})", self.sheet)?;
        for write in &self.writes {
            match write.outcome {
                WriteOutcome::Updated => writeln!(f, "  ✓ {}", write.label)?,
                WriteOutcome::SheetMissing => writeln!(f, "  ⚠ {}: sheet not found", write.label)?,
                WriteOutcome::LabelMissing => {
                    writeln!(f, "  ⚠ {}: label not in template", write.label)?
                }
            }
        }
        writeln!(
            f,
            "\n{} written, {} skipped",
            self.updated_count(),
            self.writes.len() - self.updated_count()
        )
    }
}
