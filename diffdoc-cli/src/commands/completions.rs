//! Completions command - Generate shell completion scripts

use std::io;

use clap::Command;
use clap_complete::{generate, Shell};
use colored::Colorize;
use serde::Serialize;

use super::{deliver, output_config};
use crate::config::DiffdocConfig;
use crate::output::{paint, OutputFormat, TableDisplay};

const BIN_NAME: &str = "diffdoc";

/// Where to put the generated script for one shell
#[derive(Debug, Serialize)]
pub struct CompletionInstructions {
    pub shell: String,
    pub instructions: Vec<String>,
}

impl TableDisplay for CompletionInstructions {
    fn to_table(&self, color: bool) -> String {
        let mut output = format!(
            "{} completions for {}\n\n{}\n",
            paint(BIN_NAME, color, |t| t.cyan().bold()),
            paint(&self.shell, color, |t| t.yellow()),
            paint("Installation:", color, |t| t.cyan().bold())
        );
        for instruction in &self.instructions {
            output.push_str(&format!("  {}\n", instruction));
        }
        output
    }
}

fn instructions(shell: Shell) -> Vec<String> {
    let lines: &[&str] = match shell {
        Shell::Bash => &[
            "# Add to ~/.bashrc:",
            "eval \"$(diffdoc completions bash)\"",
            "",
            "# Or save to a file:",
            "diffdoc completions bash > ~/.local/share/bash-completion/completions/diffdoc",
        ],
        Shell::Zsh => &[
            "# Save to a directory in fpath:",
            "diffdoc completions zsh > ~/.zfunc/_diffdoc",
            "# Then add to ~/.zshrc before compinit:",
            "fpath=(~/.zfunc $fpath)",
        ],
        Shell::Fish => &["diffdoc completions fish > ~/.config/fish/completions/diffdoc.fish"],
        Shell::PowerShell => &[
            "# Add to $PROFILE:",
            "Invoke-Expression (& diffdoc completions powershell | Out-String)",
        ],
        Shell::Elvish => &[
            "# Add to ~/.elvish/rc.elv:",
            "eval (diffdoc completions elvish | slurp)",
        ],
        _ => &["# See your shell's documentation for loading completion scripts."],
    };
    lines.iter().map(|l| l.to_string()).collect()
}

/// Run the completions command
///
/// Prints the completion script for `cmd`, or installation instructions.
pub fn run(
    shell: Shell,
    show_instructions: bool,
    cmd: &mut Command,
    config: &DiffdocConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if show_instructions {
        let instructions = CompletionInstructions {
            shell: shell.to_string(),
            instructions: instructions(shell),
        };
        return deliver(&instructions, output_config(config, format), None);
    }
    generate(shell, cmd, BIN_NAME, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_name_the_binary() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let lines = instructions(shell);
            assert!(lines.iter().any(|l| l.contains("diffdoc completions")));
        }
        assert!(instructions(Shell::Bash).iter().any(|l| l.contains("bashrc")));
    }

    #[test]
    fn test_plain_instructions_have_no_escapes() {
        let info = CompletionInstructions {
            shell: Shell::Zsh.to_string(),
            instructions: instructions(Shell::Zsh),
        };
        colored::control::set_override(true);
        let colored = info.to_table(true);
        let plain = info.to_table(false);
        colored::control::unset_override();
        assert!(colored.contains('\u{1b}'));
        assert!(plain.starts_with("diffdoc completions for zsh"));
        assert!(!plain.contains('\u{1b}'));
    }
}
