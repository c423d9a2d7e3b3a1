//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load an optional JSON config (first argument), start file logging and
//!   open the configured roster database (in-memory when no path is set).
//! - Seed the sample team/member on an empty roster and print page one.

use roster_core::db::open_db_with_config;
use roster_core::{
    core_version, init_logging, CoreConfig, Filter, MemberField, MemberRepository, MemberService,
    NewMember, SortSpec, SqliteMemberRepository, SqliteTeamRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(std::env::args().nth(1).map(PathBuf::from)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    println!("roster_core version={}", core_version());

    let config = match config_path {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("roster").join("logs"));
    init_logging(
        config.resolved_log_level()?.as_str(),
        &log_dir.to_string_lossy(),
    )?;

    let conn = open_db_with_config(&config.store)?;
    let service = MemberService::with_paging(
        SqliteMemberRepository::try_new(&conn)?,
        SqliteTeamRepository::try_new(&conn)?,
        config.paging,
    );

    if service.members().count_all()? == 0 {
        let team = service.create_team("TeamA")?;
        service.register(NewMember::new("TesterA", 25).with_team(team.id))?;
    }

    let page = service.page_views(
        &Filter::All,
        &SortSpec::asc(MemberField::Username),
        0,
        None,
    )?;
    println!(
        "members total={} page={} last={}",
        page.total_elements(),
        page.number(),
        page.is_last()
    );
    for view in page.content() {
        println!(
            "  id={} username={} age={} team={}",
            view.id,
            view.username,
            view.age,
            view.team_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
