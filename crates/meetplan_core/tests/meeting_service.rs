use meetplan_core::db::open_db_in_memory;
use meetplan_core::{
    AgendaError, AgendaItem, AgendaKind, AllocationError, MeetingService, MeetingServiceError,
    SqliteMeetingRepository, StartTime,
};
use uuid::Uuid;

fn with_service<T>(run: impl FnOnce(&MeetingService<SqliteMeetingRepository<'_>>) -> T) -> T {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMeetingRepository::try_new(&conn).unwrap();
    let service = MeetingService::new(repo);
    run(&service)
}

#[test]
fn create_meeting_trims_and_rejects_blank_names() {
    with_service(|service| {
        let meeting = service.create_meeting("  Kickoff  ").unwrap();
        assert_eq!(meeting.name, "Kickoff");
        assert_eq!(meeting.start_time, StartTime::DEFAULT);
        assert!(meeting.grouping.is_empty());

        assert!(matches!(
            service.create_meeting("   "),
            Err(MeetingServiceError::InvalidMeetingName)
        ));
        assert_eq!(service.list_meetings().unwrap().len(), 1);
    });
}

#[test]
fn unknown_meeting_maps_to_not_found() {
    with_service(|service| {
        let missing = Uuid::new_v4();
        assert!(matches!(
            service.get_meeting(missing),
            Err(MeetingServiceError::MeetingNotFound(id)) if id == missing
        ));
        assert!(matches!(
            service.rename_meeting(missing, "x"),
            Err(MeetingServiceError::MeetingNotFound(_))
        ));
        assert!(matches!(
            service.add_participants(missing, "Ann", "Ops"),
            Err(MeetingServiceError::MeetingNotFound(_))
        ));
    });
}

#[test]
fn rename_and_location_are_persisted() {
    with_service(|service| {
        let meeting = service.create_meeting("Draft").unwrap();
        service.rename_meeting(meeting.id, " Final ").unwrap();
        let location = service
            .save_location(meeting.id, "  Room 4 ", true)
            .unwrap();
        assert_eq!(location.address, "Room 4");

        let loaded = service.get_meeting(meeting.id).unwrap();
        assert_eq!(loaded.name, "Final");
        assert_eq!(loaded.location, location);

        service.delete_meeting(meeting.id).unwrap();
        assert!(service.list_meetings().unwrap().is_empty());
    });
}

#[test]
fn add_participants_validates_input() {
    with_service(|service| {
        let meeting = service.create_meeting("Roster").unwrap();

        for (names, dept) in [("  ", "Ops"), ("Ann", " "), ("、, ;", "Ops")] {
            assert!(matches!(
                service.add_participants(meeting.id, names, dept),
                Err(MeetingServiceError::InvalidParticipantInput(_))
            ));
        }

        let added = service
            .add_participants(meeting.id, "Ann、Bob @Cy", " Ops ")
            .unwrap();
        assert_eq!(added.len(), 3);
        assert!(added.iter().all(|p| p.dept == "Ops"));
        assert_eq!(service.get_meeting(meeting.id).unwrap().participants, added);
    });
}

#[test]
fn auto_group_reports_clamped_count_and_persists_unsaved() {
    with_service(|service| {
        let meeting = service.create_meeting("Groups").unwrap();
        service.add_participants(meeting.id, "Ann Bob Cy", "Ops").unwrap();

        let allocation = service.auto_group(meeting.id, 5.0, false).unwrap();
        assert_eq!(allocation.group_count, 3);
        assert!(allocation.clamped);

        let loaded = service.get_meeting(meeting.id).unwrap();
        assert_eq!(loaded.grouping.groups, allocation.groups);
        assert!(!loaded.grouping.saved);
    });
}

#[test]
fn auto_group_errors_leave_state_untouched() {
    with_service(|service| {
        let meeting = service.create_meeting("Empty").unwrap();
        assert!(matches!(
            service.auto_group(meeting.id, 2.0, false),
            Err(MeetingServiceError::Allocation(AllocationError::EmptyRoster))
        ));

        service.add_participants(meeting.id, "Ann Bob", "Ops").unwrap();
        for requested in [0.0, 101.0, 2.5, -1.0] {
            assert!(matches!(
                service.auto_group(meeting.id, requested, false),
                Err(MeetingServiceError::Allocation(
                    AllocationError::InvalidGroupCount(_)
                ))
            ));
        }
        assert!(service.get_meeting(meeting.id).unwrap().grouping.is_empty());
    });
}

#[test]
fn saved_grouping_requires_explicit_overwrite() {
    with_service(|service| {
        let meeting = service.create_meeting("Saved").unwrap();
        service.add_participants(meeting.id, "Ann Bob Cy Dee", "Ops").unwrap();

        assert!(matches!(
            service.save_grouping(meeting.id),
            Err(MeetingServiceError::NoGrouping(_))
        ));

        let first = service.auto_group(meeting.id, 2.0, false).unwrap();
        service.save_grouping(meeting.id).unwrap();
        assert!(service.get_meeting(meeting.id).unwrap().grouping.saved);

        assert!(matches!(
            service.auto_group(meeting.id, 2.0, false),
            Err(MeetingServiceError::SavedGroupingWouldBeLost(_))
        ));
        assert_eq!(
            service.get_meeting(meeting.id).unwrap().grouping.groups,
            first.groups
        );

        let second = service.auto_group(meeting.id, 2.0, true).unwrap();
        let loaded = service.get_meeting(meeting.id).unwrap();
        assert_eq!(loaded.grouping.groups, second.groups);
        assert!(!loaded.grouping.saved);
    });
}

#[test]
fn invalid_count_is_reported_before_saved_grouping_guard() {
    with_service(|service| {
        let meeting = service.create_meeting("Order").unwrap();
        service.add_participants(meeting.id, "Ann Bob Cy Dee", "Ops").unwrap();
        let first = service.auto_group(meeting.id, 2.0, false).unwrap();
        service.save_grouping(meeting.id).unwrap();

        for requested in [0.0, 101.0, 2.5] {
            assert!(matches!(
                service.auto_group(meeting.id, requested, false),
                Err(MeetingServiceError::Allocation(
                    AllocationError::InvalidGroupCount(_)
                ))
            ));
        }

        let loaded = service.get_meeting(meeting.id).unwrap();
        assert!(loaded.grouping.saved);
        assert_eq!(loaded.grouping.groups, first.groups);
    });
}

#[test]
fn leader_survives_regrouping_at_same_index() {
    with_service(|service| {
        let meeting = service.create_meeting("Leaders").unwrap();
        let roster = service
            .add_participants(meeting.id, "Ann Bob Cy Dee Eve Fay", "Ops")
            .unwrap();
        let allocation = service.auto_group(meeting.id, 3.0, false).unwrap();
        let second_group = allocation.groups[1].id;

        let grouping = service
            .set_leader(meeting.id, roster[4].id, second_group)
            .unwrap();
        assert_eq!(grouping.groups[1].leader_id, Some(roster[4].id));
        assert!(!grouping.groups.iter().any(|g| g.member_ids.contains(&roster[4].id)));

        let regrouped = service.auto_group(meeting.id, 3.0, false).unwrap();
        assert_eq!(regrouped.groups[1].leader_id, Some(roster[4].id));
        assert_eq!(regrouped.groups[0].leader_id, None);
    });
}

#[test]
fn grouping_edits_ignore_unknown_references() {
    with_service(|service| {
        let meeting = service.create_meeting("Edits").unwrap();
        let roster = service.add_participants(meeting.id, "Ann Bob", "Ops").unwrap();
        let allocation = service.auto_group(meeting.id, 2.0, false).unwrap();
        service.save_grouping(meeting.id).unwrap();

        let stranger = Uuid::new_v4();
        let unchanged = service
            .set_leader(meeting.id, stranger, allocation.groups[0].id)
            .unwrap();
        assert_eq!(unchanged.groups, allocation.groups);
        assert!(unchanged.saved);

        let unchanged = service
            .move_member(meeting.id, roster[0].id, Uuid::new_v4())
            .unwrap();
        assert!(unchanged.saved);

        let unchanged = service
            .clear_leader(meeting.id, allocation.groups[0].id, true)
            .unwrap();
        assert!(unchanged.saved);
    });
}

#[test]
fn clear_leader_without_return_leaves_participant_unassigned() {
    with_service(|service| {
        let meeting = service.create_meeting("Orphans").unwrap();
        let roster = service.add_participants(meeting.id, "Ann Bob", "Ops").unwrap();
        let allocation = service.auto_group(meeting.id, 1.0, false).unwrap();
        let group_id = allocation.groups[0].id;

        service.set_leader(meeting.id, roster[0].id, group_id).unwrap();
        assert!(service.unassigned_participants(meeting.id).unwrap().is_empty());

        let grouping = service.clear_leader(meeting.id, group_id, false).unwrap();
        assert_eq!(grouping.groups[0].leader_id, None);
        let orphans = service.unassigned_participants(meeting.id).unwrap();
        assert_eq!(orphans, [roster[0].clone()]);

        service.move_member(meeting.id, roster[0].id, group_id).unwrap();
        let loaded = service.get_meeting(meeting.id).unwrap();
        let members = &loaded.grouping.groups[0].member_ids;
        assert_eq!(members.last(), Some(&roster[0].id));
    });
}

#[test]
fn removing_participant_cascades_and_marks_unsaved() {
    with_service(|service| {
        let meeting = service.create_meeting("Cascade").unwrap();
        let roster = service.add_participants(meeting.id, "Ann Bob Cy", "Ops").unwrap();
        let allocation = service.auto_group(meeting.id, 2.0, false).unwrap();
        service
            .set_leader(meeting.id, roster[0].id, allocation.groups[0].id)
            .unwrap();
        service.save_grouping(meeting.id).unwrap();

        assert!(service.remove_participant(meeting.id, roster[0].id).unwrap());
        assert!(!service.remove_participant(meeting.id, roster[0].id).unwrap());

        let loaded = service.get_meeting(meeting.id).unwrap();
        assert_eq!(loaded.participants.len(), 2);
        assert_eq!(loaded.grouping.groups[0].leader_id, None);
        assert!(!loaded.grouping.saved);
        assert!(loaded
            .grouping
            .groups
            .iter()
            .all(|g| !g.member_ids.contains(&roster[0].id)));
    });
}

#[test]
fn update_participant_changes_name_and_dept() {
    with_service(|service| {
        let meeting = service.create_meeting("Rename").unwrap();
        let roster = service.add_participants(meeting.id, "Ann", "Ops").unwrap();

        let updated = service
            .update_participant(meeting.id, roster[0].id, " Anna ", " Sales ")
            .unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.dept, "Sales");
        assert_eq!(service.get_meeting(meeting.id).unwrap().participants, [updated]);

        assert!(matches!(
            service.update_participant(meeting.id, roster[0].id, " ", "Ops"),
            Err(MeetingServiceError::InvalidParticipantInput(_))
        ));
    });
}

#[test]
fn save_agenda_validates_and_schedules() {
    with_service(|service| {
        let meeting = service.create_meeting("Agenda").unwrap();

        assert!(matches!(
            service.save_agenda(meeting.id, "9.30", Vec::new()),
            Err(MeetingServiceError::Agenda(AgendaError::InvalidStartTime(_)))
        ));
        assert!(matches!(
            service.save_agenda(
                meeting.id,
                "09:00",
                vec![AgendaItem::new(AgendaKind::Discuss, "Odd", "Ann", 25)]
            ),
            Err(MeetingServiceError::Agenda(AgendaError::InvalidDuration(25)))
        ));

        let slots = service
            .save_agenda(
                meeting.id,
                "",
                vec![
                    AgendaItem::new(AgendaKind::Opening, " Welcome ", "Ann", 10),
                    AgendaItem::new(AgendaKind::Discuss, "", "", 0),
                    AgendaItem::new(AgendaKind::Lunch, "Lunch", "", 60),
                ],
            )
            .unwrap();
        let times: Vec<&str> = slots.iter().map(|slot| slot.time_text.as_str()).collect();
        assert_eq!(times, ["09:00 - 09:10", "09:10 - 10:10"]);
        assert_eq!(slots[0].item.title, "Welcome");
        assert_eq!(service.agenda_schedule(meeting.id).unwrap(), slots);
    });
}

#[test]
fn agenda_rows_can_be_added_moved_and_removed() {
    with_service(|service| {
        let meeting = service.create_meeting("Rows").unwrap();
        service
            .save_agenda(
                meeting.id,
                "14:00",
                vec![
                    AgendaItem::new(AgendaKind::Import, "Intro", "Ann", 20),
                    AgendaItem::new(AgendaKind::Converge, "Wrap", "Bob", 10),
                ],
            )
            .unwrap();

        let items = service.add_agenda_item(meeting.id).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], AgendaItem::default());

        let items = service.reorder_agenda(meeting.id, 2, 0).unwrap();
        assert_eq!(items[0], AgendaItem::default());
        assert_eq!(service.reorder_agenda(meeting.id, 0, 9).unwrap(), items);

        let items = service.remove_agenda_item(meeting.id, 0).unwrap();
        assert_eq!(items[0].title, "Intro");
        assert_eq!(service.remove_agenda_item(meeting.id, 7).unwrap(), items);

        let loaded = service.get_meeting(meeting.id).unwrap();
        assert_eq!(loaded.agenda_items, items);
        assert_eq!(loaded.start_time.to_string(), "14:00");
    });
}

#[test]
fn attendance_check_uses_stored_roster() {
    with_service(|service| {
        let meeting = service.create_meeting("Attendance").unwrap();
        service.add_participants(meeting.id, "Ann Bob Cy", "Ops").unwrap();

        let report = service
            .check_attendance(meeting.id, "Ann\n  Cy \nZed\nZed\n")
            .unwrap();
        assert_eq!(report.missing, ["Bob"]);
        assert_eq!(report.extra, ["Zed"]);
        assert!(!report.is_complete());
    });
}
