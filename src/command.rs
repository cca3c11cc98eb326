//! [`BuildCommand`]: the executable invocation handed to the controller.

use std::path::PathBuf;

/// The program, arguments, environment and working directory of a build.
///
/// Environment variables set here are passed to the child only. Nothing is
/// written into the environment of the calling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl BuildCommand {
    /// Create a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    ///
    /// A later call with the same key replaces the earlier value.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }

    /// Run the child in `dir` instead of the current directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The command line as it would be typed, for log lines.
    ///
    /// Environment values are left out so tokens never reach a log.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let cmd = BuildCommand::new("eas")
            .arg("build")
            .args(["--platform", "android"])
            .cwd("/tmp");
        assert_eq!(cmd.program, "eas");
        assert_eq!(cmd.args, vec!["build", "--platform", "android"]);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_env_replaces_existing_key() {
        let cmd = BuildCommand::new("eas")
            .env("EXPO_TOKEN", "old")
            .env("OTHER", "x")
            .env("EXPO_TOKEN", "new");
        assert_eq!(
            cmd.env,
            vec![
                ("OTHER".to_string(), "x".to_string()),
                ("EXPO_TOKEN".to_string(), "new".to_string()),
            ]
        );
    }

    #[test]
    fn test_display_hides_env() {
        let cmd = BuildCommand::new("eas")
            .args(["build", "--profile", "production"])
            .env("EXPO_TOKEN", "secret");
        let shown = cmd.display();
        assert_eq!(shown, "eas build --profile production");
        assert!(!shown.contains("secret"));
    }
}
