//! A short season driven one command per "invocation", reopening the league
//! from disk each time.

use league_engine::ManagerId;
use league_persistence::league_dir_name;
use league_service::{Command, LeagueService, Report, ServiceConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn roster(team: &str) -> String {
    let positions = ["gk", "c", "f", "f", "f", "f", "f", "f", "c"];
    let players: Vec<String> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| format!(r#"{{"name": "{team} {i}", "team_code": "{team}", "position": "{p}"}}"#))
        .collect();
    format!("[{}]", players.join(","))
}

fn stat(name: &str, team: &str, goals: u32, saves: u32) -> String {
    format!(
        r#"{{"jersey": "1", "name": "{name}", "team_code": "{team}", "team_name": "{team}",
            "goals": {goals}, "saves": {saves}, "position": "field",
            "match_id": "m1", "match_label": "NBG vs JSP"}}"#
    )
}

fn config(data_dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.league.name = "Adriatic".to_string();
    config.persistence.data_dir = data_dir.to_path_buf();
    config.persistence.snapshot.max_snapshots = 3;
    config
}

async fn invoke(data_dir: &Path, command: Command) -> Report {
    let service = LeagueService::open(config(data_dir)).await.unwrap();
    service.run(&command).await.unwrap().report
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn season_survives_between_invocations() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");

    for (id, name) in [("ana", "Ana"), ("ben", "Ben")] {
        invoke(&data_dir, Command::AddManager { id: id.into(), name: name.into(), team: String::new() })
            .await;
    }

    let nbg = write(temp.path(), "nbg.json", &roster("NBG"));
    let jsp = write(temp.path(), "jsp.json", &roster("JSP"));
    invoke(&data_dir, Command::SetLineup { manager: "ana".into(), file: nbg, week: None }).await;
    invoke(&data_dir, Command::SetLineup { manager: "ben".into(), file: jsp, week: None }).await;
    invoke(&data_dir, Command::Schedule { week: None }).await;

    // NBG 3 scores 3 goals (15); JSP 0 makes 5 saves (10)
    let feed = format!("[{},{}]", stat("NBG 3", "NBG", 3, 0), stat("JSP 0", "JSP", 0, 5));
    let feed = write(temp.path(), "week1.json", &feed);
    match invoke(&data_dir, Command::Score { stats: feed, week: None }).await {
        Report::Scores { week, matchups, .. } => {
            assert_eq!(week, 1);
            assert_eq!(matchups.len(), 1);
            assert!(matchups[0].completed);
            assert_eq!((matchups[0].team1_score, matchups[0].team2_score), (15, 10));
        }
        other => panic!("unexpected report: {other:?}"),
    }

    match invoke(&data_dir, Command::Standings).await {
        Report::Standings { standings } => {
            assert_eq!(standings[0].manager_id, ManagerId::from("ana"));
            assert_eq!((standings[0].wins, standings[0].losses, standings[0].total_points), (1, 0, 15));
            assert_eq!(standings[1].team_name, "Ben's Team");
            assert_eq!(standings[1].losses, 1);
        }
        other => panic!("unexpected report: {other:?}"),
    }

    assert_eq!(invoke(&data_dir, Command::AdvanceWeek).await, Report::Week { week: 2 });
    match invoke(&data_dir, Command::Managers).await {
        Report::Managers { managers } => {
            assert_eq!(managers[0].season.wins, 1);
            assert_eq!(managers[1].season.total_points, 10);
        }
        other => panic!("unexpected report: {other:?}"),
    }

    // Seven saves so far, three kept
    let league_dir = data_dir.join("snapshots").join(league_dir_name("Adriatic"));
    let snapshots = std::fs::read_dir(league_dir).unwrap().count();
    assert_eq!(snapshots, 3);
}

#[tokio::test]
async fn interleaved_invocations_lose_nothing() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");

    let ana = LeagueService::open(config(&data_dir)).await.unwrap();
    let ben = LeagueService::open(config(&data_dir)).await.unwrap();
    let cid = LeagueService::open(config(&data_dir)).await.unwrap();

    for (service, id) in [(&ana, "ana"), (&ben, "ben"), (&cid, "cid")] {
        service
            .run(&Command::AddManager { id: id.into(), name: id.into(), team: String::new() })
            .await
            .unwrap();
    }

    match invoke(&data_dir, Command::Managers).await {
        Report::Managers { managers } => {
            let ids: Vec<String> = managers.iter().map(|m| m.id.to_string()).collect();
            assert_eq!(ids, vec!["ana", "ben", "cid"]);
        }
        other => panic!("unexpected report: {other:?}"),
    }
}
