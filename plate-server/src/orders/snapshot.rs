//! Notes snapshot / auto-mark builder
//!
//! Pure function of (client, color mode, policy), invoked exactly once per
//! order — inside `create_order`. The result is moved into the order and
//! never rebuilt: there is no API that re-runs the builder against an
//! existing order.

use shared::models::{Client, ColorMode, NotesSnapshot};
use std::collections::HashSet;

/// MULTICOLOR 订单的固定控制标记 — 无条件，不可配置
pub const OVERPRINT_CONTROL_MARK: &str = "Overprint control";

/// BLACK 单色订单的网点扩大补偿提示（仅对策略命中的客户）
pub const DOT_GAIN_MARK: &str = "Compensate dot gain (verify RIP parameters)";

/// Which clients get the dot-gain compensation mark on BLACK orders.
///
/// 上游没有给出通用规则（原实现硬编码了单个客户 ID），因此作为可注入
/// 策略而不是核心里的业务逻辑。
pub trait DotGainPolicy: Send + Sync {
    fn requires_compensation(&self, client: &Client) -> bool;
}

/// Policy driven by a configured set of client ids (`DOT_GAIN_CLIENT_IDS`)
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDotGainPolicy {
    client_ids: HashSet<String>,
}

impl ConfiguredDotGainPolicy {
    pub fn new(client_ids: HashSet<String>) -> Self {
        Self { client_ids }
    }
}

impl DotGainPolicy for ConfiguredDotGainPolicy {
    fn requires_compensation(&self, client: &Client) -> bool {
        self.client_ids.contains(&client.id)
    }
}

/// Build the frozen annotation set for a new order.
///
/// - client tech notes are copied verbatim, preserving order;
/// - MULTICOLOR always gets the overprint control mark;
/// - BLACK gets the dot-gain mark when the policy matches the client.
pub fn build_notes_snapshot(
    client: &Client,
    color_mode: ColorMode,
    policy: &dyn DotGainPolicy,
) -> NotesSnapshot {
    let mut automated_notes = Vec::new();

    match color_mode {
        ColorMode::Multicolor => automated_notes.push(OVERPRINT_CONTROL_MARK.to_string()),
        ColorMode::Black => {
            if policy.requires_compensation(client) {
                automated_notes.push(DOT_GAIN_MARK.to_string());
            }
        }
        ColorMode::Cmyk => {}
    }

    NotesSnapshot {
        client_tech_notes: client.tech_notes.clone(),
        automated_notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::now_millis;

    fn client(id: &str, notes: &[&str]) -> Client {
        Client {
            id: id.to_string(),
            name: "Printhouse".to_string(),
            tech_notes: notes.iter().map(|s| s.to_string()).collect(),
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    fn policy_for(ids: &[&str]) -> ConfiguredDotGainPolicy {
        ConfiguredDotGainPolicy::new(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn multicolor_always_gets_overprint_control() {
        let snapshot =
            build_notes_snapshot(&client("c1", &["A", "B"]), ColorMode::Multicolor, &policy_for(&[]));
        assert_eq!(snapshot.client_tech_notes, vec!["A", "B"]);
        assert_eq!(snapshot.automated_notes, vec![OVERPRINT_CONTROL_MARK]);
    }

    #[test]
    fn black_mark_only_for_configured_clients() {
        let policy = policy_for(&["special"]);

        let hit = build_notes_snapshot(&client("special", &[]), ColorMode::Black, &policy);
        assert_eq!(hit.automated_notes, vec![DOT_GAIN_MARK]);

        let miss = build_notes_snapshot(&client("ordinary", &[]), ColorMode::Black, &policy);
        assert!(miss.automated_notes.is_empty());
    }

    #[test]
    fn cmyk_generates_no_marks() {
        let snapshot =
            build_notes_snapshot(&client("c1", &["note"]), ColorMode::Cmyk, &policy_for(&["c1"]));
        assert_eq!(snapshot.client_tech_notes, vec!["note"]);
        assert!(snapshot.automated_notes.is_empty());
    }

    #[test]
    fn tech_notes_copied_in_order() {
        let snapshot = build_notes_snapshot(
            &client("c1", &["first", "second", "third"]),
            ColorMode::Multicolor,
            &policy_for(&[]),
        );
        assert_eq!(snapshot.client_tech_notes, vec!["first", "second", "third"]);
    }
}
