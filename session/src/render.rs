//! Plain-text rendering of session snapshots for terminal output.

use proofdesk_types::{
    format_ether, AccountView, BalanceView, ConnectError, Session, SessionStatus,
};

/// The user-facing message for a failed connection attempt.
pub fn connect_error_message(error: &ConnectError) -> String {
    format!("Wallet did not connect - {}", error.message)
}

pub fn render_balance(balance: &BalanceView) -> String {
    match balance {
        BalanceView::Pending => "loading...".to_string(),
        BalanceView::Value(wei) => format_ether(*wei),
        BalanceView::Error(reason) => format!("balance unavailable ({reason})"),
    }
}

/// One line per account: address, balance, proof state.
pub fn render_account(account: &AccountView) -> String {
    format!(
        "{}  {}  {}",
        account.address,
        render_balance(&account.native_balance),
        account.proof
    )
}

/// Render a whole session, one line per account when connected.
pub fn render_session(session: &Session) -> String {
    match &session.status {
        SessionStatus::Disconnected => "Not connected".to_string(),
        SessionStatus::Connecting => "Connecting...".to_string(),
        SessionStatus::ConnectError(error) => connect_error_message(error),
        SessionStatus::Connected => session
            .accounts
            .iter()
            .map(render_account)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofdesk_types::{Address, ProofView, WEI_PER_ETHER};

    #[test]
    fn connect_error_uses_provider_message() {
        let error = ConnectError::new(Some("4001".into()), "User rejected the request.");
        assert_eq!(
            connect_error_message(&error),
            "Wallet did not connect - User rejected the request."
        );
    }

    #[test]
    fn account_line_marks_failed_fields_inline() {
        let account = AccountView::new(
            Address::new("0xA"),
            BalanceView::Error("timeout".into()),
            ProofView::fetch_error("reverted"),
        );
        assert_eq!(
            render_account(&account),
            "0xA  balance unavailable (timeout)  proof unavailable: reverted"
        );
    }

    #[test]
    fn connected_session_lists_accounts_in_order() {
        let session = Session {
            status: SessionStatus::Connected,
            accounts: vec![
                AccountView::new(
                    Address::new("0xA"),
                    BalanceView::Value(WEI_PER_ETHER),
                    ProofView::NotConfigured,
                ),
                AccountView::new(
                    Address::new("0xB"),
                    BalanceView::Pending,
                    ProofView::NotConfigured,
                ),
            ],
        };
        assert_eq!(
            render_session(&session),
            "0xA  1 ETH  no proof\n0xB  loading...  no proof"
        );
    }

    #[test]
    fn idle_states() {
        assert_eq!(render_session(&Session::new()), "Not connected");
        let connecting = Session {
            status: SessionStatus::Connecting,
            accounts: Vec::new(),
        };
        assert_eq!(render_session(&connecting), "Connecting...");
    }
}
