//! Usage text.

use crate::EOL;

/// Build the usage block. The `use` line depends on whether the invocation
/// can change the calling shell's environment.
pub fn render(can_mutate_environment: bool, feed_names: &[String]) -> String {
    let use_description = if can_mutate_environment {
        "Use a node version in the current environment"
    } else {
        "(Not available, source nvs.sh instead)"
    };

    [
        "NVS (Node Version Switcher) usage".to_string(),
        String::new(),
        "nvs add <version>            Download and install a node version".to_string(),
        "nvs rm <version>             Uninstall a node version".to_string(),
        format!("nvs use [version]            {}", use_description),
        "nvs run <version> [args]...  Run a script using a node version".to_string(),
        "nvs ls                       List installed node versions".to_string(),
        "nvs ls-available [feed]      List node versions available to install".to_string(),
        "nvs which [version]          Show the path to a node version".to_string(),
        "nvs link [version]           Create a \"current\" dir symlink to a version".to_string(),
        "nvs unlink [version]         Remove a \"current\" dir symlink".to_string(),
        String::new(),
        "A version string consists of a semantic version number or version label".to_string(),
        "(\"lts\" or \"latest\"), optionally preceded by a feed name, optionally".to_string(),
        "followed by an architecture, separated by slashes.".to_string(),
        "Examples: \"lts\", \"4.6.0\", \"6.3.1/x86\", \"node/6.7.0/x64\"".to_string(),
        String::new(),
        format!("Configured feed names: {}", feed_names.join(", ")),
        String::new(),
    ]
    .join(EOL)
}
