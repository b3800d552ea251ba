use super::*;

fn roster() -> Roster {
    Roster::new(["Jay", "Yash", "Pari", "Aaryan", "Arjun", "Krishna"]).unwrap()
}

#[test]
fn test_roster_rejects_duplicates() {
    assert_eq!(
        Roster::new(["Jay", "Jay"]),
        Err(ValidationError::DuplicateRosterEntry("Jay".to_string()))
    );
    assert_eq!(
        Roster::new(Vec::<String>::new()),
        Err(ValidationError::EmptyRoster)
    );
}

#[test]
fn test_roster_lookup_is_exact() {
    let roster = roster();
    assert_eq!(roster.len(), 6);
    assert!(roster.contains("Jay"));
    assert!(!roster.contains("jay"));
    assert!(!roster.contains("Mallory"));
}

#[test]
fn test_finishing_order_keeps_submitted_order() {
    let order = FinishingOrder::new(&roster(), ["Pari", "Jay", "Yash"]).unwrap();
    let names: Vec<_> = order.players().iter().map(Player::name).collect();
    assert_eq!(names, ["Pari", "Jay", "Yash"]);
    assert_eq!(order.at(0), Some(&Player::from("Pari")));
    assert_eq!(order.at(3), None);
}

#[test]
fn test_finishing_order_validation() {
    let roster = roster();

    // Unknown players are reported before the count
    assert_eq!(
        FinishingOrder::new(&roster, ["Mallory"]),
        Err(ValidationError::UnknownPlayer("Mallory".to_string()))
    );
    assert_eq!(
        FinishingOrder::new(&roster, ["Jay"]),
        Err(ValidationError::PlayerCount(1))
    );
    assert_eq!(
        FinishingOrder::new(&roster, ["Jay", "Yash", "Pari", "Aaryan", "Arjun", "Krishna", "Jay"]),
        Err(ValidationError::PlayerCount(7))
    );
    assert_eq!(
        FinishingOrder::new(&roster, ["Jay", "Yash", "Jay"]),
        Err(ValidationError::DuplicatePlayer("Jay".to_string()))
    );
}

#[test]
fn test_session_date_parsing() {
    let date: SessionDate = "2024-01-01".parse().unwrap();
    assert_eq!(date.to_string(), "2024-01-01");
    assert_eq!(
        " 2024-02-29 ".parse::<SessionDate>().unwrap().to_string(),
        "2024-02-29"
    );

    for bad in ["", "2024-13-01", "2023-02-29", "01/01/2024"] {
        assert_eq!(
            bad.parse::<SessionDate>(),
            Err(ValidationError::InvalidDate(bad.to_string()))
        );
    }
}

#[test]
fn test_submission_checks_players_before_date() {
    let roster = roster();
    assert_eq!(
        Submission::new(&roster, "not a date", ["Jay", "Mallory"]),
        Err(ValidationError::UnknownPlayer("Mallory".to_string()))
    );
    assert_eq!(
        Submission::new(&roster, "not a date", ["Jay", "Yash"]),
        Err(ValidationError::InvalidDate("not a date".to_string()))
    );
}

#[test]
fn test_views_serialize_as_plain_json() {
    let view = BalancesView {
        balances: vec![Balance {
            player: "Yash".into(),
            balance: 300,
        }],
        debts: vec![DebtPair {
            debtor: "Jay".into(),
            creditor: "Yash".into(),
            total: 300,
        }],
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "balances": [{ "player": "Yash", "balance": 300 }],
            "debts": [{ "debtor": "Jay", "creditor": "Yash", "total": 300 }],
        })
    );
    assert_eq!(view.balance_of("Yash"), Some(300));
    assert_eq!(view.balance_of("Jay"), None);
}
