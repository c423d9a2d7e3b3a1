use roster_core::db::open_db_in_memory;
use roster_core::{
    Filter, InvalidPageArgument, MemberField, MemberProbe, MemberService, NewMember, PageError,
    PagingConfig, ServiceError, SortSpec, SqliteMemberRepository, SqliteTeamRepository, TeamId,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> MemberService<SqliteMemberRepository<'_>, SqliteTeamRepository<'_>> {
    MemberService::with_paging(
        SqliteMemberRepository::try_new(conn).unwrap(),
        SqliteTeamRepository::try_new(conn).unwrap(),
        PagingConfig {
            default_limit: 3,
            max_limit: 4,
        },
    )
}

fn seed(service: &MemberService<SqliteMemberRepository<'_>, SqliteTeamRepository<'_>>) {
    let team_a = service.create_team("TeamA").unwrap();
    let team_b = service.create_team("TeamB").unwrap();
    for (name, team) in [
        ("m1", Some(team_a.id)),
        ("m2", Some(team_b.id)),
        ("m3", Some(team_a.id)),
        ("m4", None),
        ("m5", Some(team_b.id)),
        ("m6", None),
    ] {
        let mut member = NewMember::new(name, 10);
        member.team_id = team;
        service.register(member).unwrap();
    }
}

#[test]
fn page_views_resolve_team_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed(&service);

    let page = service
        .page_views(&Filter::All, &SortSpec::asc(MemberField::Username), 0, Some(4))
        .unwrap();

    let rows: Vec<(&str, Option<&str>)> = page
        .content()
        .iter()
        .map(|view| (view.username.as_str(), view.team_name.as_deref()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("m1", Some("TeamA")),
            ("m2", Some("TeamB")),
            ("m3", Some("TeamA")),
            ("m4", None),
        ]
    );
    assert_eq!(page.total_elements(), 6);
}

#[test]
fn missing_limit_uses_default_and_large_limit_clamps() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed(&service);

    let defaulted = service
        .page_members(&Filter::All, &SortSpec::unsorted(), 0, None)
        .unwrap();
    assert_eq!(defaulted.len(), 3);
    assert_eq!(defaulted.limit(), 3);

    let clamped = service
        .page_members(&Filter::All, &SortSpec::unsorted(), 0, Some(1_000))
        .unwrap();
    assert_eq!(clamped.len(), 4);
    assert_eq!(clamped.total_pages(), 2);
}

#[test]
fn explicit_zero_limit_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .page_members(&Filter::All, &SortSpec::unsorted(), 0, Some(0))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Page(PageError::InvalidArgument(
            InvalidPageArgument::NonPositiveLimit(0)
        ))
    ));
}

#[test]
fn register_requires_existing_team() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .register(NewMember::new("ghost", 1).with_team(TeamId(77)))
        .unwrap_err();
    assert!(matches!(err, ServiceError::TeamNotFound(TeamId(77))));
    assert_eq!(
        service
            .page_members(&Filter::All, &SortSpec::unsorted(), 0, None)
            .unwrap()
            .total_elements(),
        0
    );
}

#[test]
fn query_by_example_and_bulk_update_go_through_service() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed(&service);

    let probe = MemberProbe {
        team_name: Some("TeamB".to_string()),
        ..MemberProbe::default()
    };
    let found = service.find_by_example(&probe).unwrap();
    assert_eq!(found.len(), 2);

    assert_eq!(service.bulk_age_plus(10).unwrap(), 6);
    let aged = service
        .page_members(&Filter::eq(MemberField::Age, 11), &SortSpec::unsorted(), 0, Some(10))
        .unwrap();
    assert_eq!(aged.total_elements(), 6);
}

#[test]
fn page_views_filter_on_joined_team_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    seed(&service);

    let page = service
        .page_views(
            &Filter::eq(MemberField::TeamName, "TeamB"),
            &SortSpec::asc(MemberField::Username),
            0,
            None,
        )
        .unwrap();

    let names: Vec<&str> = page
        .content()
        .iter()
        .map(|view| view.username.as_str())
        .collect();
    assert_eq!(names, vec!["m2", "m5"]);
    assert!(page
        .content()
        .iter()
        .all(|view| view.team_name.as_deref() == Some("TeamB")));
    assert!(page.is_last());
}
