//! Path-driven mapping of a source file to its group and targets.

use pbxsync_types::source::{Classification, GroupQuery, SourceFile};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_GROUP: &str = "Unknown";
pub const TARGET_IOS: &str = "iOS";
pub const TARGET_WATCH: &str = "Watch";

/// Segment condition shared by both rule kinds.
///
/// Matches when every `when` segment and no `unless` segment appears among
/// the path's components.
fn segments_match(file: &SourceFile, when: &[String], unless: &[String]) -> bool {
    let has = |seg: &String| file.segments().any(|s| s == seg);
    when.iter().all(has) && !unless.iter().any(has)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    #[serde(default)]
    pub when: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unless: Vec<String>,
    pub group: String,
    /// Path hint handed to the group locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl GroupRule {
    fn new(when: &[&str], group: &str, path: Option<&str>) -> Self {
        Self {
            when: when.iter().map(|s| s.to_string()).collect(),
            unless: vec![],
            group: group.to_string(),
            path: path.map(str::to_string),
        }
    }

    pub fn matches(&self, file: &SourceFile) -> bool {
        segments_match(file, &self.when, &self.unless)
    }

    fn query(&self) -> GroupQuery {
        GroupQuery {
            name: self.group.clone(),
            path_hint: self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    #[serde(default)]
    pub when: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unless: Vec<String>,
    pub targets: Vec<String>,
}

impl TargetRule {
    fn new(when: &[&str], unless: &[&str], targets: &[&str]) -> Self {
        Self {
            when: when.iter().map(|s| s.to_string()).collect(),
            unless: unless.iter().map(|s| s.to_string()).collect(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn matches(&self, file: &SourceFile) -> bool {
        segments_match(file, &self.when, &self.unless)
    }
}

/// Two ordered rule lists; the first matching rule of each list wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub groups: Vec<GroupRule>,
    pub targets: Vec<TargetRule>,
    pub fallback_group: String,
    pub fallback_targets: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            groups: default_group_rules(),
            targets: default_target_rules(),
            fallback_group: DEFAULT_FALLBACK_GROUP.to_string(),
            fallback_targets: vec![TARGET_IOS.to_string()],
        }
    }
}

impl RuleSet {
    pub fn classify(&self, file: &SourceFile) -> Classification {
        let group = self
            .groups
            .iter()
            .find(|r| r.matches(file))
            .map(GroupRule::query)
            .unwrap_or_else(|| GroupQuery::named(self.fallback_group.clone()));

        let raw = self
            .targets
            .iter()
            .find(|r| r.matches(file))
            .map(|r| r.targets.as_slice())
            .unwrap_or(self.fallback_targets.as_slice());

        let mut targets: Vec<String> = Vec::with_capacity(raw.len());
        for t in raw {
            if !targets.contains(t) {
                targets.push(t.clone());
            }
        }

        Classification { group, targets }
    }

    /// Every logical target name any rule can produce.
    pub fn target_names(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let all = self
            .targets
            .iter()
            .flat_map(|r| r.targets.iter())
            .chain(self.fallback_targets.iter());
        for t in all {
            if !out.contains(t) {
                out.push(t.clone());
            }
        }
        out
    }
}

pub fn default_group_rules() -> Vec<GroupRule> {
    vec![
        GroupRule::new(&["Tests"], "Tests", None),
        GroupRule::new(
            &["Plena Watch App", "Views"],
            "Views",
            Some("Plena Watch App/Views"),
        ),
        GroupRule::new(&["Plena Watch App"], "Plena Watch App", None),
        GroupRule::new(
            &["Plena", "Views", "Components"],
            "Components",
            Some("Plena/Views/Components"),
        ),
        GroupRule::new(&["Plena", "Views"], "Views", Some("Plena/Views")),
        GroupRule::new(&["Plena"], "Plena", None),
        GroupRule::new(&["PlenaShared", "Models"], "Models", None),
        GroupRule::new(&["PlenaShared", "Services"], "Services", None),
        GroupRule::new(&["PlenaShared", "ViewModels"], "ViewModels", None),
        GroupRule::new(&["PlenaShared"], "PlenaShared", None),
    ]
}

pub fn default_target_rules() -> Vec<TargetRule> {
    vec![
        TargetRule::new(&["Plena Watch App"], &[], &[TARGET_WATCH]),
        TargetRule::new(&["PlenaShared"], &[], &[TARGET_IOS, TARGET_WATCH]),
        TargetRule::new(&["Plena"], &["Watch"], &[TARGET_IOS]),
        TargetRule::new(&["Tests"], &[], &[TARGET_IOS]),
    ]
}
