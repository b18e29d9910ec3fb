//! Page graph composition: which pages a session emits and how they link.
//!
//! Order is fixed: home, the main page, then one page per feature in session
//! order (feature sets only).
use crate::model::{build_page_model, slugify, NavLink, Navigation, PageKind, PageModel, HOME_ROUTE};
use crate::session::{Archetype, Session, SessionRecord, SetupTypeError};
use serde::Serialize;

/// Composition failures. Both are contract violations by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("session has no setup type")]
    MissingSetupType,
    #[error("unknown setup type: {0:?}")]
    UnknownSetupType(String),
}

impl From<SetupTypeError> for ComposeError {
    fn from(err: SetupTypeError) -> Self {
        match err {
            SetupTypeError::Missing => ComposeError::MissingSetupType,
            SetupTypeError::Unknown(value) => ComposeError::UnknownSetupType(value),
        }
    }
}

/// One page to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub route: String,
    pub template_id: &'static str,
    pub kind: PageKind,
    pub model: PageModel,
}

/// Ordered pages for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGraph {
    pub pages: Vec<PageDescriptor>,
}

impl PageGraph {
    pub fn routes(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.route.as_str()).collect()
    }

    /// The setup-type page (second entry).
    pub fn main_page(&self) -> Option<&PageDescriptor> {
        self.pages.get(1)
    }
}

/// Compose a graph from an untyped record.
pub fn compose_record(record: &SessionRecord) -> Result<PageGraph, ComposeError> {
    let session = Session::from_record(record)?;
    Ok(compose(&session))
}

/// Compose the page graph for a typed session.
pub fn compose(session: &Session) -> PageGraph {
    let main = build_page_model(session);
    let main_kind = PageKind::main_for(session.setup_type());

    let mut pages = vec![
        home_page(&main),
        PageDescriptor {
            route: main.navigation.current.clone(),
            template_id: main_kind.template_id(),
            kind: main_kind,
            model: main.clone(),
        },
    ];
    if let Archetype::FeatureSet { features, .. } = &session.archetype {
        let parent = NavLink::new(PageKind::FeatureSet, &session.metadata.name);
        for feature in features {
            let slug = slugify(&feature.name);
            let route = PageKind::Feature.route(&slug);
            let mut related = vec![parent.clone()];
            related.extend(
                features
                    .iter()
                    .filter(|other| slugify(&other.name) != slug)
                    .map(|other| NavLink::new(PageKind::Feature, &other.name)),
            );
            let model = PageModel {
                title: feature.name.clone(),
                description: feature
                    .description
                    .clone()
                    .or_else(|| main.description.clone()),
                slug,
                navigation: Navigation {
                    home: HOME_ROUTE.to_string(),
                    current: route.clone(),
                    parent: Some(parent.clone()),
                    related,
                },
                current_feature: Some(feature.clone()),
                ..main.clone()
            };
            pages.push(PageDescriptor {
                route,
                template_id: PageKind::Feature.template_id(),
                kind: PageKind::Feature,
                model,
            });
        }
    }

    tracing::debug!(
        setup_type = %session.setup_type(),
        pages = pages.len(),
        "composed page graph"
    );
    PageGraph { pages }
}

/// Home page: the session model, pointing at itself and the main page.
fn home_page(main: &PageModel) -> PageDescriptor {
    let main_kind = PageKind::main_for(main.setup_type);
    let mut related = vec![NavLink {
        title: main.title.clone(),
        slug: main.slug.clone(),
        url: main.navigation.current.clone(),
        kind: main_kind,
    }];
    related.extend(main.navigation.related.iter().cloned());
    let model = PageModel {
        navigation: Navigation {
            home: HOME_ROUTE.to_string(),
            current: HOME_ROUTE.to_string(),
            parent: None,
            related,
        },
        ..main.clone()
    };
    PageDescriptor {
        route: HOME_ROUTE.to_string(),
        template_id: PageKind::Home.template_id(),
        kind: PageKind::Home,
        model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Feature, Metadata};

    fn record(setup_type: &str, name: &str, features: &[&str]) -> SessionRecord {
        SessionRecord {
            setup_type: Some(setup_type.to_string()),
            metadata: Metadata {
                name: name.to_string(),
                jtbd: Some("Get the job done".to_string()),
                ..Metadata::default()
            },
            features: features
                .iter()
                .map(|name| Feature {
                    name: name.to_string(),
                    ..Feature::default()
                })
                .collect(),
            ..SessionRecord::default()
        }
    }

    #[test]
    fn feature_set_emits_home_set_and_one_page_per_feature() {
        let graph =
            compose_record(&record("feature-set-and-features", "Suite", &["A", "B", "C"]))
                .expect("compose");
        assert_eq!(graph.pages.len(), 5);
        assert_eq!(
            graph.routes(),
            [
                "index.html",
                "feature-set/suite.html",
                "feature/a.html",
                "feature/b.html",
                "feature/c.html"
            ]
        );
        let templates: Vec<&str> = graph.pages.iter().map(|page| page.template_id).collect();
        assert_eq!(templates, ["home", "feature-set", "feature", "feature", "feature"]);

        let set_slug = &graph.pages[1].model.slug;
        for page in &graph.pages[2..] {
            let parent = page.model.navigation.parent.as_ref().expect("back-link");
            assert_eq!(&parent.slug, set_slug);
            assert_eq!(parent.url, graph.pages[1].route);
            assert_eq!(page.model.navigation.current, page.route);
            assert!(page.model.current_feature.is_some());
        }
        assert_eq!(graph.pages[3].model.title, "B");
        assert_eq!(graph.pages[3].model.slug, "b");
    }

    #[test]
    fn single_feature_keeps_dangling_set_link() {
        let mut rec = record("feature", "Smart Search", &["Smart Search"]);
        rec.metadata.belongs_to_feature_set = Some("Not Generated".to_string());
        let graph = compose_record(&rec).expect("compose");
        assert_eq!(graph.routes(), ["index.html", "feature/smart-search.html"]);
        let main = graph.main_page().expect("main page");
        assert_eq!(
            main.model.navigation.related[0].url,
            "feature-set/not-generated.html"
        );
    }

    #[test]
    fn solution_and_agent_emit_two_pages() {
        let solution = compose_record(&record("solution-initial-setup", "Core", &[])).unwrap();
        assert_eq!(solution.routes(), ["index.html", "solution/core.html"]);
        let agent = compose_record(&record("agent-setup", "Helper Bot", &[])).unwrap();
        assert_eq!(agent.routes(), ["index.html", "agent/helper-bot.html"]);
        assert_eq!(agent.pages[0].model.navigation.related[0].url, "agent/helper-bot.html");
    }

    #[test]
    fn unknown_or_missing_setup_type_is_fatal() {
        let err = compose_record(&record("wizard", "W", &[])).unwrap_err();
        assert_eq!(err, ComposeError::UnknownSetupType("wizard".to_string()));
        assert!(err.to_string().contains("wizard"));

        let mut rec = record("feature", "W", &[]);
        rec.setup_type = None;
        assert_eq!(compose_record(&rec).unwrap_err(), ComposeError::MissingSetupType);
    }

    #[test]
    fn composition_is_repeatable() {
        let rec = record("feature-set-and-features", "Suite", &["A", "B"]);
        assert_eq!(compose_record(&rec).unwrap(), compose_record(&rec).unwrap());
    }
}
