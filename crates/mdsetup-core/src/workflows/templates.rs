use super::error::WorkflowError;
use minijinja::Environment;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TEMPLATE_EXTENSION: &str = "jinja2";

/// Families of templates shipped with the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateGroup {
    Equil,
    Prod,
    Scripts,
    Leap,
}

impl TemplateGroup {
    /// Directory name of the group inside the template tree.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Equil => "equil",
            Self::Prod => "prod",
            Self::Scripts => "scripts",
            Self::Leap => "leap",
        }
    }

    /// Names of the templates in the group, in execution order.
    pub fn names(self) -> Vec<&'static str> {
        embedded(self).iter().map(|(name, _)| *name).collect()
    }
}

impl fmt::Display for TemplateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

macro_rules! templates {
    ($group:literal: $($name:literal),+ $(,)?) => {
        &[$(($name, include_str!(concat!("../../templates/", $group, "/", $name, ".jinja2")))),+]
    };
}

static EQUIL: &[(&str, &str)] = templates!("equil":
    "min1", "md1", "min2", "md2",
    "min11", "md11", "min12", "md12", "min13", "md13", "min14", "md14", "min15", "md15", "md16",
);
static PROD: &[(&str, &str)] = templates!("prod": "mdst", "mdprod");
static SCRIPTS: &[(&str, &str)] = templates!("scripts": "equil", "prod");
static LEAP: &[(&str, &str)] = templates!("leap": "solvate", "fixed", "tleap");

fn embedded(group: TemplateGroup) -> &'static [(&'static str, &'static str)] {
    match group {
        TemplateGroup::Equil => EQUIL,
        TemplateGroup::Prod => PROD,
        TemplateGroup::Scripts => SCRIPTS,
        TemplateGroup::Leap => LEAP,
    }
}

/// Looks up and renders templates.
///
/// Templates are compiled into the library. An optional override directory laid out as
/// `<dir>/<group>/<name>.jinja2` takes precedence for any template it contains.
pub struct TemplateLibrary {
    env: Environment<'static>,
    override_dir: Option<PathBuf>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self {
            env,
            override_dir: None,
        }
    }

    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
            ..Self::new()
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Returns the source of a template, or `None` if neither the override directory nor the
    /// built-in set has it.
    pub fn source(
        &self,
        group: TemplateGroup,
        name: &str,
    ) -> Result<Option<Cow<'static, str>>, WorkflowError> {
        if let Some(dir) = &self.override_dir {
            let path = dir
                .join(group.dir_name())
                .join(format!("{name}.{TEMPLATE_EXTENSION}"));
            if path.is_file() {
                debug!("Using template override {}", path.display());
                let text = fs::read_to_string(&path).map_err(WorkflowError::io(&path))?;
                return Ok(Some(Cow::Owned(text)));
            }
        }
        Ok(embedded(group)
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, text)| Cow::Borrowed(*text)))
    }

    /// Renders a template with `context`. `Ok(None)` means the template does not exist.
    pub fn render<S: Serialize>(
        &self,
        group: TemplateGroup,
        name: &str,
        context: S,
    ) -> Result<Option<String>, WorkflowError> {
        let Some(source) = self.source(group, name)? else {
            return Ok(None);
        };
        self.env
            .render_str(&source, context)
            .map(Some)
            .map_err(|source| WorkflowError::Template {
                name: format!("{group}/{name}"),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use tempfile::tempdir;

    #[test]
    fn every_group_has_its_templates() {
        assert_eq!(TemplateGroup::Equil.names().len(), 15);
        assert!(!TemplateGroup::Equil.names().contains(&"min16"));
        assert_eq!(TemplateGroup::Prod.names(), vec!["mdst", "mdprod"]);
        assert_eq!(TemplateGroup::Scripts.names(), vec!["equil", "prod"]);
        assert_eq!(TemplateGroup::Leap.names(), vec!["solvate", "fixed", "tleap"]);
    }

    #[test]
    fn leap_template_renders_input_and_prefix() {
        let library = TemplateLibrary::new();
        let text = library
            .render(
                TemplateGroup::Leap,
                "solvate",
                context! { input => "protein.pdb", prefix => "solvated" },
            )
            .unwrap()
            .unwrap();
        assert!(text.contains("loadpdb protein.pdb"));
        assert!(text.contains("saveamberparm system solvated.parm7 solvated.rst7"));
        assert!(text.ends_with("quit\n"));
    }

    #[test]
    fn unknown_template_is_none() {
        let library = TemplateLibrary::new();
        assert!(
            library
                .render(TemplateGroup::Leap, "missing", context! {})
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn override_directory_takes_precedence() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("leap")).unwrap();
        fs::write(dir.path().join("leap/solvate.jinja2"), "custom {{ prefix }}\n").unwrap();
        fs::write(dir.path().join("leap/extra.jinja2"), "extra\n").unwrap();

        let library = TemplateLibrary::with_overrides(dir.path());
        let render = |name| {
            library
                .render(TemplateGroup::Leap, name, context! { prefix => "x", input => "y" })
                .unwrap()
        };
        assert_eq!(render("solvate").as_deref(), Some("custom x\n"));
        assert_eq!(render("extra").as_deref(), Some("extra\n"));
        assert!(render("fixed").unwrap().contains("loadpdb y"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("leap")).unwrap();
        fs::write(dir.path().join("leap/broken.jinja2"), "{% if %}").unwrap();
        let library = TemplateLibrary::with_overrides(dir.path());
        assert!(matches!(
            library.render(TemplateGroup::Leap, "broken", context! {}),
            Err(WorkflowError::Template { .. })
        ));
    }
}
