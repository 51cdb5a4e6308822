// ═══════════════════════════════════════════════════════════════════
// Season Tests — leadership rule, state machine, baseline capture
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use groupfolio_core::errors::CoreError;
use groupfolio_core::models::group::Group;
use groupfolio_core::models::holding::{AssetClass, Holding};
use groupfolio_core::models::member::Member;
use groupfolio_core::services::season::SeasonService;

fn crew_of_three() -> (Group, Vec<Uuid>) {
    let mut group = Group::new("Crew");
    let names = ["Ala", "Bo", "Cy"];
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let member = Member::new(*name, (i as u16) * 100, 1000.0);
        ids.push(member.id);
        group.members.push(member);
    }
    (group, ids)
}

// ── Leadership ──────────────────────────────────────────────────────

#[test]
fn first_member_leads_by_convention() {
    let (group, ids) = crew_of_three();
    let service = SeasonService::new();
    assert!(group.leader_id.is_none());
    assert!(service.is_group_leader(&group, ids[0]));
    assert!(!service.is_group_leader(&group, ids[1]));
    assert!(!service.is_group_leader(&group, ids[2]));
}

#[test]
fn explicit_leader_overrides_convention() {
    let (mut group, ids) = crew_of_three();
    group.leader_id = Some(ids[2]);
    let service = SeasonService::new();
    assert!(!service.is_group_leader(&group, ids[0]));
    assert!(service.is_group_leader(&group, ids[2]));
}

#[test]
fn first_start_season_records_leader_permanently() {
    let (mut group, ids) = crew_of_three();
    let service = SeasonService::new();

    service
        .start_season(&mut group, ids[0], "Q1", Utc::now())
        .unwrap();
    assert_eq!(group.leader_id, Some(ids[0]));

    // Ending the season does not reassign leadership.
    service.end_season(&mut group, ids[0], Utc::now()).unwrap();
    assert_eq!(group.leader_id, Some(ids[0]));
}

// ── State machine ───────────────────────────────────────────────────

#[test]
fn start_season_captures_baselines_for_every_member() {
    let (mut group, ids) = crew_of_three();
    group
        .holdings
        .push(Holding::new(ids[1], "AAPL", "Apple", AssetClass::Stock, 2.0, 100.0));
    let service = SeasonService::new();

    let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let season_id = service.start_season(&mut group, ids[0], "Summer", at).unwrap();

    let season = group.seasons.iter().find(|s| s.id == season_id).unwrap();
    assert!(season.is_active());
    assert_eq!(season.started_at, at);
    assert_eq!(season.leader_id, ids[0]);
    assert_eq!(season.baselines.len(), 3);
    assert_eq!(season.baselines.get(ids[0]), Some(1000.0));
    // Bo holds 2 AAPL marked at the 100 buy price: 1000 cash + 200.
    assert_eq!(season.baselines.get(ids[1]), Some(1200.0));
    assert_eq!(group.current_season_id, Some(season_id));
}

#[test]
fn non_leader_cannot_start_or_end() {
    let (mut group, ids) = crew_of_three();
    let service = SeasonService::new();

    let result = service.start_season(&mut group, ids[1], "Rogue", Utc::now());
    assert!(matches!(result, Err(CoreError::NotGroupLeader)));
    assert!(group.seasons.is_empty());
    assert!(group.current_season_id.is_none());

    service.start_season(&mut group, ids[0], "Q1", Utc::now()).unwrap();
    let result = service.end_season(&mut group, ids[1], Utc::now());
    assert!(matches!(result, Err(CoreError::NotGroupLeader)));
    assert!(group.active_season().is_some());
}

#[test]
fn cannot_start_while_active_or_end_while_idle() {
    let (mut group, ids) = crew_of_three();
    let service = SeasonService::new();

    let result = service.end_season(&mut group, ids[0], Utc::now());
    assert!(matches!(result, Err(CoreError::NoActiveSeason)));

    service.start_season(&mut group, ids[0], "Q1", Utc::now()).unwrap();
    let result = service.start_season(&mut group, ids[0], "Q2", Utc::now());
    assert!(matches!(result, Err(CoreError::SeasonAlreadyActive)));
    assert_eq!(group.seasons.len(), 1);
}

#[test]
fn end_season_stamps_and_clears_pointer() {
    let (mut group, ids) = crew_of_three();
    let service = SeasonService::new();

    let season_id = service.start_season(&mut group, ids[0], "Q1", Utc::now()).unwrap();
    let ended_at = Utc.with_ymd_and_hms(2025, 9, 30, 23, 59, 0).unwrap();
    let ended = service.end_season(&mut group, ids[0], ended_at).unwrap();
    assert_eq!(ended, season_id);

    let season = group.seasons.iter().find(|s| s.id == season_id).unwrap();
    assert_eq!(season.ended_at, Some(ended_at));
    assert!(group.current_season_id.is_none());
    assert!(group.active_season().is_none());

    // A new season may now begin.
    service.start_season(&mut group, ids[0], "Q2", Utc::now()).unwrap();
    assert_eq!(group.seasons.len(), 2);
}

#[test]
fn stranger_cannot_control_seasons() {
    let (mut group, _ids) = crew_of_three();
    let service = SeasonService::new();
    let result = service.start_season(&mut group, Uuid::new_v4(), "Ghost", Utc::now());
    assert!(matches!(result, Err(CoreError::MemberNotFound(_))));
}

#[test]
fn season_transitions_append_activity() {
    use groupfolio_core::models::activity::ActivityKind;

    let (mut group, ids) = crew_of_three();
    let service = SeasonService::new();

    service.start_season(&mut group, ids[0], "Q1", Utc::now()).unwrap();
    assert!(group
        .activity
        .iter()
        .any(|e| e.kind == ActivityKind::SeasonStarted));

    service.end_season(&mut group, ids[0], Utc::now()).unwrap();
    assert!(group
        .activity
        .iter()
        .any(|e| e.kind == ActivityKind::SeasonEnded));

    // Failed attempts leave no trace in the log.
    let before = group.activity.len();
    let _ = service.end_season(&mut group, ids[0], Utc::now());
    assert_eq!(group.activity.len(), before);
}
