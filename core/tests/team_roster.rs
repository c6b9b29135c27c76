//! Team member ids on the wire and the assignment roster.

use loanbook_core::team::{MemberId, TeamMember};
use serde_json::json;

#[test]
fn member_id_encoding() {
    assert_eq!(serde_json::to_value(MemberId::from(42)).unwrap(), json!(42));
    assert_eq!(serde_json::to_value(MemberId::from("me")).unwrap(), json!("me"));
    assert_eq!(serde_json::to_value(MemberId::Absent).unwrap(), json!(0));
}

#[test]
fn member_id_decoding() {
    let decode = |v: serde_json::Value| serde_json::from_value::<MemberId>(v);
    assert_eq!(decode(json!(0)).unwrap(), MemberId::Absent);
    assert!(matches!(decode(json!(17)).unwrap(), MemberId::Integer(n) if n.get() == 17));
    assert!(matches!(decode(json!(-4)).unwrap(), MemberId::Integer(n) if n.get() == -4));
    assert_eq!(decode(json!("me")).unwrap(), MemberId::Text("me".to_string()));
    assert_eq!(decode(json!("0")).unwrap(), MemberId::Text("0".to_string()));
}

#[test]
fn member_id_rejects_other_shapes() {
    for bad in [json!(null), json!(1.5), json!(true), json!([1]), json!({"id": 1})] {
        assert!(
            serde_json::from_value::<MemberId>(bad.clone()).is_err(),
            "{bad} should be rejected"
        );
    }
    assert!(serde_json::from_str::<MemberId>("18446744073709551615").is_err());
}

/// Every id decodes back to what was encoded; 0 has exactly one form.
#[test]
fn member_ids_round_trip_unchanged() {
    let ids = [
        MemberId::from(1),
        MemberId::from(-1),
        MemberId::from(i64::MAX),
        MemberId::from(i64::MIN),
        MemberId::from(0),
        MemberId::from("me"),
        MemberId::from(""),
    ];
    for id in ids {
        let encoded = serde_json::to_string(&id).unwrap();
        let decoded: MemberId = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, id, "round trip through {encoded}");
    }
}

#[test]
fn from_zero_is_absent() {
    assert!(MemberId::from(0).is_absent());
    assert!(!MemberId::from(5).is_absent());
    assert_eq!(MemberId::Absent.to_string(), "0");
}

#[test]
fn roster_prepends_fixed_entries() {
    let roster = TeamMember::roster(vec![
        TeamMember::new(MemberId::from(3), "Tunde", "Analyst"),
        TeamMember::new(MemberId::from(7), "Kemi", "Auditor"),
    ]);
    assert_eq!(roster.len(), 4);
    assert_eq!(roster[0].id, MemberId::Absent);
    assert_eq!(roster[0].name, "Unassigned");
    assert_eq!(roster[1].id, MemberId::Text("me".to_string()));
    assert_eq!(roster[1].role, "Current User");
    assert_eq!(roster[3].name, "Kemi");

    let json = serde_json::to_value(&roster).unwrap();
    assert_eq!(json[0]["id"], json!(0));
    assert_eq!(json[1]["id"], json!("me"));
    assert_eq!(json[2]["id"], json!(3));
}

#[test]
fn empty_roster_still_has_fixed_entries() {
    assert_eq!(TeamMember::roster(Vec::new()).len(), 2);
}
