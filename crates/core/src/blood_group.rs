//! Blood groups and donor compatibility.
//!
//! Stored donor records spell groups inconsistently (`"A+"`, `"A -"`, `"a+"`), so every
//! comparison goes through [`normalize_blood_group`] first. The compatibility table lists, for
//! each requested group, the donor groups allowed to supply it.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Removes every whitespace character and uppercases the remainder.
///
/// Idempotent: normalizing an already-normalized string returns it unchanged.
pub fn normalize_blood_group(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// One of the eight ABO/RhD groups.
///
/// The `NK` (not known) marker found in some donor records is deliberately not a variant;
/// it never parses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

use BloodGroup::*;

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive, ONegative,
    ];

    /// The universal donor group.
    pub const UNIVERSAL_DONOR: BloodGroup = ONegative;

    pub fn as_str(self) -> &'static str {
        match self {
            APositive => "A+",
            ANegative => "A-",
            BPositive => "B+",
            BNegative => "B-",
            AbPositive => "AB+",
            AbNegative => "AB-",
            OPositive => "O+",
            ONegative => "O-",
        }
    }

    /// Parses any spelling of a group after normalization. Unknown input yields `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = normalize_blood_group(input);
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalized)
    }

    /// Donor groups that may supply a request for `self`.
    ///
    /// The `AB-` row accepts only `AB-`. Clinically it should also accept `A-`, `B-` and
    /// `O-`; the narrower row is kept as deployed and is covered by a test.
    pub fn accepted_donors(self) -> &'static [BloodGroup] {
        match self {
            APositive => &[APositive, ANegative, OPositive, ONegative],
            ANegative => &[ANegative, ONegative],
            BPositive => &[BPositive, BNegative, OPositive, ONegative],
            BNegative => &[BNegative, ONegative],
            AbPositive => &[
                APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive,
                ONegative,
            ],
            AbNegative => &[AbNegative],
            OPositive => &[OPositive, ONegative],
            ONegative => &[ONegative],
        }
    }

    /// Whether a donor of group `donor` may supply a request for `self`.
    pub fn accepts(self, donor: BloodGroup) -> bool {
        self.accepted_donors().contains(&donor)
    }
}

/// Resolves a requested group string to the donor groups eligible to supply it.
///
/// Unrecognised groups resolve to the empty slice rather than an error, so a dispatch for
/// them simply matches nobody.
pub fn compatible_donor_groups(requested: &str) -> &'static [BloodGroup] {
    BloodGroup::parse(requested).map_or(&[], BloodGroup::accepted_donors)
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BloodGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidInput(format!("unknown blood group: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(groups: &[&str]) -> BTreeSet<String> {
        groups.iter().map(|g| g.to_string()).collect()
    }

    fn resolved(requested: &str) -> BTreeSet<String> {
        compatible_donor_groups(requested)
            .iter()
            .map(|g| g.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_table_matches_literally() {
        let expected: [(&str, &[&str]); 8] = [
            ("A+", &["A+", "A-", "O+", "O-"]),
            ("A-", &["A-", "O-"]),
            ("B+", &["B+", "B-", "O+", "O-"]),
            ("B-", &["B-", "O-"]),
            ("AB+", &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"]),
            ("AB-", &["AB-"]),
            ("O+", &["O+", "O-"]),
            ("O-", &["O-"]),
        ];

        for (requested, donors) in expected {
            assert_eq!(resolved(requested), set(donors), "row {requested}");
        }
    }

    #[test]
    fn test_ab_negative_row_is_narrower_than_clinical_rule() {
        // Known deviation: A-, B- and O- are clinically compatible with AB- but not listed.
        assert_eq!(BloodGroup::AbNegative.accepted_donors(), &[BloodGroup::AbNegative]);
        assert!(!BloodGroup::AbNegative.accepts(BloodGroup::UNIVERSAL_DONOR));
    }

    #[test]
    fn test_universal_donor_in_every_other_row() {
        for group in BloodGroup::ALL {
            if group == BloodGroup::AbNegative {
                continue;
            }
            assert!(
                group.accepts(BloodGroup::UNIVERSAL_DONOR),
                "O- missing from {group}"
            );
        }
    }

    #[test]
    fn test_ab_positive_accepts_everyone() {
        for donor in BloodGroup::ALL {
            assert!(BloodGroup::AbPositive.accepts(donor));
        }
    }

    #[test]
    fn test_unknown_group_resolves_empty() {
        assert!(compatible_donor_groups("Z+").is_empty());
        assert!(compatible_donor_groups("NK").is_empty());
        assert!(compatible_donor_groups("").is_empty());
    }

    #[test]
    fn test_resolver_normalizes_input() {
        assert_eq!(resolved("a -"), set(&["A-", "O-"]));
        assert_eq!(resolved(" ab + "), resolved("AB+"));
    }

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize_blood_group("A -"), "A-");
        assert_eq!(normalize_blood_group("a+"), "A+");
        assert_eq!(normalize_blood_group(" O+ "), "O+");
        assert_eq!(normalize_blood_group("ab\t-"), "AB-");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["A -", "a+", " O+ ", "AB -", "nk", "Z+"] {
            let once = normalize_blood_group(raw);
            assert_eq!(normalize_blood_group(&once), once);
        }
    }

    #[test]
    fn test_parse_and_display_agree() {
        for group in BloodGroup::ALL {
            assert_eq!(BloodGroup::parse(&group.to_string()), Some(group));
        }
        assert_eq!(BloodGroup::parse("NK"), None);
        assert!("Q-".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_serde_uses_symbolic_names() {
        let json = serde_json::to_string(&BloodGroup::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
    }
}
