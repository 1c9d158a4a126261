use crate::report::shell_quote::{join_statements, join_words, r_string_literal};
use crate::report::slot::OutputSlot;
use std::path::PathBuf;

pub const CONTAINER_WORKDIR: &str = "/home/quarto";
pub const CRAN_REPOSITORY: &str = "http://cran.us.r-project.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEcosystem {
    Python,
    R,
}

impl RuntimeEcosystem {
    pub const ALL: [RuntimeEcosystem; 2] = [RuntimeEcosystem::Python, RuntimeEcosystem::R];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::R => "r",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraPackages {
    pub python: Vec<String>,
    pub r: Vec<String>,
}

impl ExtraPackages {
    pub fn for_ecosystem(&self, ecosystem: RuntimeEcosystem) -> &[String] {
        match ecosystem {
            RuntimeEcosystem::Python => &self.python,
            RuntimeEcosystem::R => &self.r,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.python.is_empty() && self.r.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    argv: Vec<String>,
}

impl CommandStep {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn to_shell(&self) -> String {
        join_words(&self.argv)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub host_directory: PathBuf,
    pub working_directory: String,
    pub document_file: String,
    pub package_install_steps: Vec<CommandStep>,
    pub render_command: CommandStep,
}

impl BuildJob {
    pub fn steps(&self) -> Vec<CommandStep> {
        let mut steps = self.package_install_steps.clone();
        steps.push(CommandStep::new(["cd", self.working_directory.as_str()]));
        steps.push(self.render_command.clone());
        steps
    }

    pub fn shell_script(&self) -> String {
        let statements: Vec<String> = self.steps().iter().map(CommandStep::to_shell).collect();
        join_statements(&statements)
    }
}

pub fn install_step(ecosystem: RuntimeEcosystem, packages: &[String]) -> Option<CommandStep> {
    if packages.is_empty() {
        return None;
    }
    let step = match ecosystem {
        RuntimeEcosystem::Python => {
            let mut argv = vec!["pip".to_string(), "install".to_string()];
            argv.extend(packages.iter().cloned());
            CommandStep::new(argv)
        }
        RuntimeEcosystem::R => {
            let names = packages
                .iter()
                .map(|name| r_string_literal(name))
                .collect::<Vec<_>>()
                .join(", ");
            let expression = format!(
                "install.packages(c({names}), repos={})",
                r_string_literal(CRAN_REPOSITORY)
            );
            CommandStep::new(["sudo", "R", "--vanilla", "-e", expression.as_str()])
        }
    };
    Some(step)
}

pub fn compose(slot: &OutputSlot, document_file: &str, extra: &ExtraPackages) -> BuildJob {
    let package_install_steps = RuntimeEcosystem::ALL
        .into_iter()
        .filter_map(|ecosystem| install_step(ecosystem, extra.for_ecosystem(ecosystem)))
        .collect();

    BuildJob {
        host_directory: slot.directory_path.clone(),
        working_directory: CONTAINER_WORKDIR.to_string(),
        document_file: document_file.to_string(),
        package_install_steps,
        render_command: CommandStep::new(["quarto", "render", document_file]),
    }
}
