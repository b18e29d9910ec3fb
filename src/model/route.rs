use crate::setup_type::SetupType;
use serde::Serialize;

/// Route of the home page.
pub const HOME_ROUTE: &str = "index.html";

/// Kind of emitted page; fixes its template id and route prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    Home,
    FeatureSet,
    Feature,
    #[serde(rename = "feature-2")]
    Feature2,
    Solution,
    Agent,
}

impl PageKind {
    /// Main page kind for a setup type.
    pub fn main_for(setup_type: SetupType) -> PageKind {
        match setup_type {
            SetupType::FeatureSetAndFeatures => PageKind::FeatureSet,
            SetupType::Feature => PageKind::Feature,
            SetupType::Feature2 => PageKind::Feature2,
            SetupType::SolutionInitialSetup => PageKind::Solution,
            SetupType::AgentSetup => PageKind::Agent,
        }
    }

    pub fn template_id(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::FeatureSet => "feature-set",
            PageKind::Feature => "feature",
            PageKind::Feature2 => "feature-2",
            PageKind::Solution => "solution",
            PageKind::Agent => "agent",
        }
    }

    /// Relative route of a page of this kind for `slug`.
    pub fn route(&self, slug: &str) -> String {
        match self {
            PageKind::Home => HOME_ROUTE.to_string(),
            other => format!("{}/{slug}.html", other.template_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_follow_template_prefixes() {
        assert_eq!(PageKind::Home.route("ignored"), "index.html");
        assert_eq!(PageKind::FeatureSet.route("auth"), "feature-set/auth.html");
        assert_eq!(PageKind::Feature2.route("upload"), "feature-2/upload.html");
        assert_eq!(
            PageKind::main_for(SetupType::SolutionInitialSetup).route("core"),
            "solution/core.html"
        );
    }
}
