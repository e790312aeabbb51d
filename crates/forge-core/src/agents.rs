use crate::error::{ForgeError, Result};
use serde::Serialize;

/// An AI assistant a project can be initialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub key: &'static str,
    pub name: &'static str,
    /// Directory the assistant keeps its files in, relative to the project.
    pub folder: &'static str,
    pub install_url: Option<&'static str>,
    /// IDE-based assistants have no command-line tool to look for.
    pub requires_cli: bool,
}

pub const DEFAULT_AGENT: &str = "claude";

pub const AGENTS: &[AgentInfo] = &[
    AgentInfo {
        key: "copilot",
        name: "GitHub Copilot",
        folder: ".github/",
        install_url: None,
        requires_cli: false,
    },
    AgentInfo {
        key: "claude",
        name: "Claude Code",
        folder: ".claude/",
        install_url: Some("https://docs.anthropic.com/en/docs/claude-code/setup"),
        requires_cli: true,
    },
    AgentInfo {
        key: "gemini",
        name: "Gemini CLI",
        folder: ".gemini/",
        install_url: Some("https://github.com/google-gemini/gemini-cli"),
        requires_cli: true,
    },
    AgentInfo {
        key: "cursor-agent",
        name: "Cursor",
        folder: ".cursor/",
        install_url: None,
        requires_cli: false,
    },
    AgentInfo {
        key: "qwen",
        name: "Qwen Code",
        folder: ".qwen/",
        install_url: Some("https://github.com/QwenLM/qwen-code"),
        requires_cli: true,
    },
    AgentInfo {
        key: "opencode",
        name: "opencode",
        folder: ".opencode/",
        install_url: Some("https://opencode.ai"),
        requires_cli: true,
    },
    AgentInfo {
        key: "codex",
        name: "Codex CLI",
        folder: ".codex/",
        install_url: Some("https://github.com/openai/codex"),
        requires_cli: true,
    },
    AgentInfo {
        key: "windsurf",
        name: "Windsurf",
        folder: ".windsurf/",
        install_url: None,
        requires_cli: false,
    },
    AgentInfo {
        key: "kilocode",
        name: "Kilo Code",
        folder: ".kilocode/",
        install_url: None,
        requires_cli: false,
    },
    AgentInfo {
        key: "auggie",
        name: "Auggie CLI",
        folder: ".augment/",
        install_url: Some("https://docs.augmentcode.com/cli/setup-auggie/install-auggie-cli"),
        requires_cli: true,
    },
    AgentInfo {
        key: "codebuddy",
        name: "CodeBuddy",
        folder: ".codebuddy/",
        install_url: Some("https://www.codebuddy.ai/cli"),
        requires_cli: true,
    },
    AgentInfo {
        key: "roo",
        name: "Roo Code",
        folder: ".roo/",
        install_url: None,
        requires_cli: false,
    },
    AgentInfo {
        key: "q",
        name: "Amazon Q Developer CLI",
        folder: ".amazonq/",
        install_url: Some("https://aws.amazon.com/developer/learning/q-developer-cli/"),
        requires_cli: true,
    },
];

pub fn find_agent(key: &str) -> Result<&'static AgentInfo> {
    AGENTS
        .iter()
        .find(|a| a.key == key)
        .ok_or_else(|| ForgeError::UnknownAgent(key.to_string()))
}

pub fn agent_keys() -> Vec<&'static str> {
    AGENTS.iter().map(|a| a.key).collect()
}

impl AgentInfo {
    /// Whether the assistant's command-line tool is on `PATH`. Always true
    /// for IDE-based assistants.
    pub fn is_installed(&self) -> bool {
        !self.requires_cli || which::which(self.key).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys = agent_keys();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AGENTS.len());
    }

    #[test]
    fn find_known_agent() {
        let claude = find_agent("claude").unwrap();
        assert_eq!(claude.folder, ".claude/");
        assert!(claude.requires_cli);
        assert!(claude.install_url.is_some());
    }

    #[test]
    fn find_unknown_agent_errors() {
        let err = find_agent("clippy").unwrap_err();
        assert!(matches!(err, ForgeError::UnknownAgent(ref k) if k == "clippy"));
    }

    #[test]
    fn ide_agents_need_no_cli() {
        for agent in AGENTS.iter().filter(|a| !a.requires_cli) {
            assert!(agent.install_url.is_none(), "{}", agent.key);
            assert!(agent.is_installed());
        }
    }

    #[test]
    fn default_agent_is_registered() {
        assert!(find_agent(DEFAULT_AGENT).is_ok());
    }

    #[test]
    fn folders_are_hidden_directories() {
        for agent in AGENTS {
            assert!(agent.folder.starts_with('.') && agent.folder.ends_with('/'));
        }
    }
}
