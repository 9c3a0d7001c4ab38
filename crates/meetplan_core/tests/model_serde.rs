use meetplan_core::{AgendaItem, AgendaKind, Group, Meeting, Participant, StartTime};
use serde_json::json;

#[test]
fn agenda_kind_and_start_time_use_wire_friendly_forms() {
    let item = AgendaItem::new(AgendaKind::Converge, "Wrap", "Ann", 20);
    let value = serde_json::to_value(&item).unwrap();

    assert_eq!(value["kind"], json!("converge"));
    assert_eq!(
        serde_json::to_value(StartTime::from_hm(7, 5).unwrap()).unwrap(),
        json!("07:05")
    );
}

#[test]
fn invalid_start_time_is_rejected_on_deserialize() {
    assert!(serde_json::from_value::<StartTime>(json!("24:00")).is_err());
    assert!(serde_json::from_value::<StartTime>(json!("9:5")).is_err());
    assert_eq!(
        serde_json::from_value::<StartTime>(json!("9:05")).unwrap(),
        StartTime::from_hm(9, 5).unwrap()
    );
}

#[test]
fn meeting_survives_json_round_trip() {
    let mut meeting = Meeting::new("Board");
    let ann = Participant::new("Ann", "Ops");
    let mut group = Group::new("Group 1");
    group.leader_id = Some(ann.id);
    meeting.participants.push(ann);
    meeting.grouping.groups.push(group);

    let text = serde_json::to_string(&meeting).unwrap();
    let decoded: Meeting = serde_json::from_str(&text).unwrap();

    assert_eq!(decoded, meeting);
}
