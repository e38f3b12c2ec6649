//! Metric extraction from BLAST pairwise text reports.
//!
//! The scan is line oriented. Each line is tested against the markers in a
//! fixed order and only the first marker found is used. Every match
//! overwrites the previous value, so for a multi-hit report the metrics of
//! the last hit survive.

use serde::{Deserialize, Serialize};

/// Metrics pulled from one report. Fields whose marker never appears stay
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentMetrics {
    pub score: String,
    pub expect_value: String,
    pub identities: String,
    pub gaps: String,
    pub strand: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Score,
    Expect,
    Identities,
    Gaps,
    Strand,
}

impl Marker {
    /// Priority order for a single line
    const ALL: [Marker; 5] = [
        Marker::Score,
        Marker::Expect,
        Marker::Identities,
        Marker::Gaps,
        Marker::Strand,
    ];

    fn label(self) -> &'static str {
        match self {
            Marker::Score => "Score =",
            Marker::Expect => "Expect =",
            Marker::Identities => "Identities =",
            Marker::Gaps => "Gaps =",
            Marker::Strand => "Strand =",
        }
    }

    fn extract(self, line: &str) -> String {
        // Value is the segment between the first and second '=' on the
        // line, not the text after the marker itself.
        let value = line.split('=').nth(1).unwrap_or("").trim();
        match self {
            Marker::Score | Marker::Expect => value.split_whitespace().next().unwrap_or("").to_string(),
            Marker::Identities | Marker::Gaps => value.split(',').next().unwrap_or("").to_string(),
            Marker::Strand => value.to_string(),
        }
    }
}

/// Stateless report parser. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportParser;

impl ReportParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, report: &str) -> AlignmentMetrics {
        let mut metrics = AlignmentMetrics::default();

        for line in report.lines() {
            let Some(marker) = Marker::ALL.iter().copied().find(|m| line.contains(m.label())) else {
                continue;
            };

            let value = marker.extract(line);
            match marker {
                Marker::Score => metrics.score = value,
                Marker::Expect => metrics.expect_value = value,
                Marker::Identities => metrics.identities = value,
                Marker::Gaps => metrics.gaps = value,
                Marker::Strand => metrics.strand = value,
            }
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HIT: &str = "\
>Reference_Sequence
Length=850

 Score = 150 bits (81),  Expect = 1e-10
 Identities = 95/100 (95%), Gaps = 2/100 (2%)
 Strand=Plus/Plus
";

    #[test]
    fn test_score_line_shadows_expect_on_same_line() {
        let metrics = ReportParser::new().parse(HIT);
        assert_eq!(metrics.score, "150");
        assert_eq!(metrics.expect_value, "");
        assert_eq!(metrics.identities, "95/100 (95%)");
        // "Gaps =" shares a line with "Identities =" and loses.
        assert_eq!(metrics.gaps, "");
        // NCBI writes "Strand=" without spaces; the marker needs " = ".
        assert_eq!(metrics.strand, "");
    }

    #[test]
    fn test_strand_is_trimmed() {
        let metrics = ReportParser::new().parse(" Strand = Plus/Minus  \n");
        assert_eq!(metrics.strand, "Plus/Minus");
    }

    #[test]
    fn test_blank_report() {
        assert_eq!(ReportParser::new().parse(""), AlignmentMetrics::default());
    }
}
