use regex::Regex;
use std::sync::OnceLock;

/// Inline spans only count as commands when they start with one of these.
const INLINE_PREFIXES: &[&str] = &[
    "ls", "cd", "cat", "grep", "find", "mkdir", "rm", "cp", "mv", "sudo", "touch",
];

fn fenced_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:bash|sh|shell)?\n(.*?)```").expect("fenced block regex is valid")
    })
}

fn inline_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("inline span regex is valid"))
}

fn looks_like_inline_command(span: &str) -> bool {
    span.contains(' ') && INLINE_PREFIXES.iter().any(|p| span.starts_with(p))
}

/// Pull candidate shell commands out of a model reply.
///
/// Every non-comment line of every fenced block comes first, in document
/// order, followed by inline `code` spans that look like commands. Nothing is
/// deduplicated.
pub fn extract_commands(text: &str) -> Vec<String> {
    let mut commands = Vec::new();

    for caps in fenced_block_re().captures_iter(text) {
        let body = caps.get(1).map_or("", |m| m.as_str());
        commands.extend(
            body.trim()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }

    for caps in inline_span_re().captures_iter(text) {
        let span = caps.get(1).map_or("", |m| m.as_str()).trim();
        if looks_like_inline_command(span) {
            commands.push(span.to_string());
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::classify;
    use crate::types::RiskTier;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_yields_nothing() {
        assert!(extract_commands("Just restart your computer.").is_empty());
        assert!(extract_commands("").is_empty());
    }

    #[test]
    fn bash_block_skips_comments() {
        let text = "Try:\n```bash\n# list files\nls -la\n```";
        let commands = extract_commands(text);
        assert_eq!(commands, vec!["ls -la".to_string()]);
        assert_eq!(classify(&commands[0]), RiskTier::Safe);
    }

    #[test]
    fn inline_rm_is_extracted_and_dangerous() {
        let text = "You could run `rm -rf /` but please don't.";
        let commands = extract_commands(text);
        assert_eq!(commands, vec!["rm -rf /".to_string()]);
        assert_eq!(classify(&commands[0]), RiskTier::Dangerous);
    }

    #[test]
    fn untagged_and_shell_tagged_blocks_are_read() {
        let text = "```\npwd\n```\nthen\n```sh\n  whoami  \n\n```\nor\n```shell\ndf -h\n```";
        assert_eq!(
            extract_commands(text),
            vec!["pwd".to_string(), "whoami".to_string(), "df -h".to_string()]
        );
    }

    #[test]
    fn other_language_blocks_are_ignored() {
        let text = "```python\nprint('hi')\n```";
        assert!(extract_commands(text).is_empty());
    }

    #[test]
    fn fenced_commands_come_before_inline_ones() {
        let text = "First `cat notes.txt`, then:\n```bash\nls -la\ngrep foo bar.txt\n```";
        assert_eq!(
            extract_commands(text),
            vec![
                "ls -la".to_string(),
                "grep foo bar.txt".to_string(),
                "cat notes.txt".to_string(),
            ]
        );
    }

    #[test]
    fn inline_spans_need_a_space_and_a_known_prefix() {
        let text = "Set `HOME`, pass `--force`, run `ls`, try `echo hello`, or `mkdir -p out`.";
        assert_eq!(extract_commands(text), vec!["mkdir -p out".to_string()]);
    }

    #[test]
    fn duplicates_are_kept() {
        let text = "```bash\nls -la\n```\nand again `ls -la`";
        assert_eq!(
            extract_commands(text),
            vec!["ls -la".to_string(), "ls -la".to_string()]
        );
    }

    #[test]
    fn multiple_blocks_keep_document_order() {
        let text = "A:\n```bash\ncd /tmp\n```\nB:\n```bash\nls\n# done\n```";
        assert_eq!(
            extract_commands(text),
            vec!["cd /tmp".to_string(), "ls".to_string()]
        );
    }

    #[test]
    fn rewrapping_an_extracted_command_round_trips() {
        let reply = "Use this:\n```bash\nfind . -name '*.rs'\n```";
        for command in extract_commands(reply) {
            let wrapped = format!("```bash\n{}\n```", command);
            assert_eq!(extract_commands(&wrapped), vec![command]);
        }
    }
}
