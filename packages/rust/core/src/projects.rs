//! API project registry.
//!
//! Several independently documented API surfaces (one per public header set)
//! are merged into one site. The registry keys them by name, fills in derived
//! defaults (symbol index location, syntax domain) and designates the default
//! project that unqualified symbol references resolve against.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use docconf_shared::{ApiConfig, ConfigError, ProjectDecl};

/// Subdirectory of a project's doxygen output holding the XML symbol index.
const SYMBOL_INDEX_DIR: &str = "xml";

/// One documented API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiProject {
    pub name: String,
    pub include_root: PathBuf,
    /// Headers under `include_root`, in declaration order. Never empty.
    pub headers: Vec<String>,
    /// Where the symbol extractor writes this project's index. Opaque here.
    pub symbol_index: PathBuf,
    /// Syntax domain used to highlight signatures (e.g. `c`).
    pub domain: String,
}

/// Registry-wide settings the symbol extractor applies to every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractorSettings {
    /// Header file extension to syntax domain.
    pub domain_by_extension: BTreeMap<String, String>,
    /// Member options applied to every documented symbol (e.g. `members`).
    pub default_members: Vec<String>,
    /// Extra options passed through to the extractor, keyed by option name.
    pub options: BTreeMap<String, String>,
    /// Whether macro definitions show their initializer.
    pub show_define_initializer: bool,
}

impl ExtractorSettings {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self {
            domain_by_extension: api.domain_by_extension.clone(),
            default_members: api.default_members.clone(),
            options: api.extractor_options.clone(),
            show_define_initializer: api.show_define_initializer,
        }
    }
}

/// Name-keyed API projects plus the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRegistry {
    projects: Vec<ApiProject>,
    by_name: HashMap<String, usize>,
    default: usize,
    extractor: ExtractorSettings,
}

impl ProjectRegistry {
    /// Build the registry from the `[api]` section.
    pub fn from_config(api: &ApiConfig) -> Result<Self, ConfigError> {
        Self::build(
            &api.projects,
            &api.default_project,
            &ProjectDefaults {
                primary_domain: &api.primary_domain,
                symbol_index_root: &api.symbol_index_root,
                domain_by_extension: &api.domain_by_extension,
            },
            ExtractorSettings::from_config(api),
        )
    }

    /// Validate declarations and build the registry.
    ///
    /// Rejects an empty list, duplicate names, projects without headers, and a
    /// default that names no declared project.
    #[instrument(skip_all, fields(projects = decls.len(), default = default_project))]
    pub fn build(
        decls: &[ProjectDecl],
        default_project: &str,
        defaults: &ProjectDefaults<'_>,
        extractor: ExtractorSettings,
    ) -> Result<Self, ConfigError> {
        if decls.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        let mut projects = Vec::with_capacity(decls.len());
        let mut by_name = HashMap::with_capacity(decls.len());

        for decl in decls {
            if by_name.contains_key(&decl.name) {
                return Err(ConfigError::DuplicateProject {
                    name: decl.name.clone(),
                });
            }
            if decl.headers.is_empty() {
                return Err(ConfigError::EmptyProjectHeaders {
                    name: decl.name.clone(),
                });
            }

            let project = defaults.apply(decl);
            debug!(
                name = %project.name,
                domain = %project.domain,
                symbol_index = %project.symbol_index.display(),
                "registered API project"
            );
            by_name.insert(project.name.clone(), projects.len());
            projects.push(project);
        }

        let default = *by_name.get(default_project).ok_or_else(|| {
            ConfigError::UnknownDefaultProject {
                name: default_project.to_string(),
            }
        })?;

        Ok(Self {
            projects,
            by_name,
            default,
            extractor,
        })
    }

    /// Project by name, or `ProjectNotFound`.
    pub fn lookup(&self, name: &str) -> Result<&ApiProject, ConfigError> {
        self.by_name
            .get(name)
            .map(|&i| &self.projects[i])
            .ok_or_else(|| ConfigError::ProjectNotFound {
                name: name.to_string(),
            })
    }

    /// The designated default project.
    pub fn default(&self) -> &ApiProject {
        &self.projects[self.default]
    }

    pub fn default_name(&self) -> &str {
        &self.default().name
    }

    /// Projects in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ApiProject> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Project name to symbol index location, for the symbol extractor.
    pub fn symbol_sources(&self) -> BTreeMap<&str, &Path> {
        self.iter()
            .map(|p| (p.name.as_str(), p.symbol_index.as_path()))
            .collect()
    }

    /// Project name to `(include_root, headers)`, for the symbol extractor.
    pub fn header_sources(&self) -> BTreeMap<&str, (&Path, &[String])> {
        self.iter()
            .map(|p| (p.name.as_str(), (p.include_root.as_path(), p.headers.as_slice())))
            .collect()
    }

    pub fn extractor(&self) -> &ExtractorSettings {
        &self.extractor
    }
}

/// Serialized as `{ "default": name, "projects": { name: project, ... }, "extractor": {...} }`.
impl Serialize for ProjectRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            default: &'a str,
            projects: BTreeMap<&'a str, &'a ApiProject>,
            extractor: &'a ExtractorSettings,
        }

        Wire {
            default: self.default_name(),
            projects: self.iter().map(|p| (p.name.as_str(), p)).collect(),
            extractor: self.extractor(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Derived defaults
// ---------------------------------------------------------------------------

/// Values filled into declarations that leave them out.
#[derive(Debug, Clone, Copy)]
pub struct ProjectDefaults<'a> {
    pub primary_domain: &'a str,
    pub symbol_index_root: &'a Path,
    pub domain_by_extension: &'a BTreeMap<String, String>,
}

impl ProjectDefaults<'_> {
    fn apply(&self, decl: &ProjectDecl) -> ApiProject {
        let symbol_index = decl.symbol_index.clone().unwrap_or_else(|| {
            self.symbol_index_root
                .join(&decl.name)
                .join(SYMBOL_INDEX_DIR)
        });

        let domain = decl
            .domain
            .clone()
            .or_else(|| {
                decl.headers
                    .first()
                    .and_then(|h| Path::new(h).extension())
                    .and_then(|ext| self.domain_by_extension.get(ext.to_str()?))
                    .cloned()
            })
            .unwrap_or_else(|| self.primary_domain.to_string());

        ApiProject {
            name: decl.name.clone(),
            include_root: decl.include_root.clone(),
            headers: decl.headers.clone(),
            symbol_index,
            domain,
        }
    }
}
