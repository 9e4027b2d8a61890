use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

/// Print the completion script for `shell` to stdout
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    write_script(shell, cmd, &mut io::stdout().lock())
}

pub fn write_script<W: Write>(shell: Shell, cmd: &mut Command, out: &mut W) -> Result<()> {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut cmd = Command::new("scorewatch").subcommand(Command::new("scrape"));
        let mut out = Vec::new();
        write_script(shell, &mut cmd, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bash_script_names_binary() {
        let bash = script(Shell::Bash);
        assert!(bash.contains("_scorewatch()"));
        assert!(bash.contains("scrape"));
    }

    #[test]
    fn test_fish_script_names_binary() {
        assert!(script(Shell::Fish).contains("complete -c scorewatch"));
    }
}
