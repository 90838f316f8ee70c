use crate::types::RiskTier;

// Substring matches. Any hit is Dangerous no matter what the command starts with.
const DANGEROUS_PATTERNS: &[&str] = &[
    "rm -rf",
    "dd",
    "mkfs",
    "fdisk",
    "parted",
    "shred",
    "wipefs",
    ":(){:|:&};:",
    ":(){ :|:& };:",
    "fork()",
    "while true",
    "> /dev/",
    "truncate",
    ">/dev/sda",
    ">/dev/sd",
];

const FILESYSTEM_MUTATING: &[&str] = &["rm", "rmdir", "mv", "cp", "ln", "unlink"];

const PROTECTED_PATHS: &[&str] = &["/", "/home", "/etc", "/usr", "/var", "/boot"];

const ELEVATED: &[&str] = &[
    "sudo",
    "su",
    "passwd",
    "usermod",
    "groupmod",
    "chown",
    "chmod",
    "mount",
    "umount",
    "systemctl",
    "service",
    "apt",
    "yum",
    "dnf",
    "pacman",
    "snap",
    "pip install",
    "npm install",
    "gem install",
];

const READ_ONLY: &[&str] = &[
    "ls", "cd", "cat", "pwd", "echo", "which", "whereis", "man", "help", "grep", "find", "head",
    "tail", "less", "more", "wc", "sort", "uniq", "date", "cal", "whoami", "id", "groups",
    "history", "alias", "type", "file", "stat", "du", "df", "free", "uptime", "ps", "top", "htop",
    "git status", "git log", "git diff", "git show", "git branch",
];

fn starts_with_any(cmd: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| cmd.starts_with(p))
}

fn contains_any(cmd: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| cmd.contains(n))
}

/// Assign a risk tier to a shell command.
///
/// Rules are checked in order and the first match wins: dangerous substrings,
/// filesystem-mutating verbs (Dangerous when a protected path appears, Sudo
/// otherwise), privileged verbs, read-only verbs. Everything else is Unknown.
/// This is a text heuristic, not a shell parser.
pub fn classify(cmd: &str) -> RiskTier {
    let cmd = cmd.trim().to_lowercase();

    if contains_any(&cmd, DANGEROUS_PATTERNS) {
        return RiskTier::Dangerous;
    }

    if starts_with_any(&cmd, FILESYSTEM_MUTATING) {
        if contains_any(&cmd, PROTECTED_PATHS) {
            return RiskTier::Dangerous;
        }
        return RiskTier::Sudo;
    }

    if starts_with_any(&cmd, ELEVATED) {
        return RiskTier::Sudo;
    }

    if starts_with_any(&cmd, READ_ONLY) {
        return RiskTier::Safe;
    }

    RiskTier::Unknown
}
