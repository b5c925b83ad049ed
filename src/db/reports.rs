use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{PlayerLine, PlayerStat, Report, ReportDetail, TeamResult, TeamResultDetail};
use super::StoreResult;

pub fn create_report(conn: &Connection, report: &str) -> StoreResult<Report> {
    conn.execute("INSERT INTO reports (report) VALUES (?1)", params![report])?;
    Ok(Report {
        id: conn.last_insert_rowid(),
        report: report.to_string(),
    })
}

pub fn create_team_result(
    conn: &Connection,
    report_id: i64,
    team: &str,
    result: &str,
) -> StoreResult<TeamResult> {
    conn.execute(
        "INSERT INTO team_results (report_id, team, result) VALUES (?1, ?2, ?3)",
        params![report_id, team, result],
    )?;
    Ok(TeamResult {
        id: conn.last_insert_rowid(),
        report_id,
        team: team.to_string(),
        result: result.to_string(),
    })
}

pub fn create_player_stat(
    conn: &Connection,
    team_result_id: i64,
    line: &PlayerLine,
) -> StoreResult<PlayerStat> {
    conn.execute(
        "INSERT INTO player_stats (
            team_result_id, backnumber, player,
            offense_rebound, defense_rebound, total_rebound,
            assist, steal, block,
            score_1q, score_2q, score_3q, score_4q, score_ot, score_total
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            team_result_id,
            line.backnumber,
            line.player,
            line.offense_rebound,
            line.defense_rebound,
            line.total_rebound,
            line.assist,
            line.steal,
            line.block,
            line.score_1q,
            line.score_2q,
            line.score_3q,
            line.score_4q,
            line.score_ot,
            line.score_total,
        ],
    )?;
    Ok(PlayerStat {
        id: conn.last_insert_rowid(),
        team_result_id,
        line: line.clone(),
    })
}

fn player_stat_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerStat> {
    Ok(PlayerStat {
        id: row.get(0)?,
        team_result_id: row.get(1)?,
        line: PlayerLine {
            backnumber: row.get(2)?,
            player: row.get(3)?,
            offense_rebound: row.get(4)?,
            defense_rebound: row.get(5)?,
            total_rebound: row.get(6)?,
            assist: row.get(7)?,
            steal: row.get(8)?,
            block: row.get(9)?,
            score_1q: row.get(10)?,
            score_2q: row.get(11)?,
            score_3q: row.get(12)?,
            score_4q: row.get(13)?,
            score_ot: row.get(14)?,
            score_total: row.get(15)?,
        },
    })
}

pub fn list_reports(conn: &Connection) -> StoreResult<Vec<Report>> {
    let mut stmt = conn.prepare("SELECT id, report FROM reports ORDER BY id")?;
    let reports = stmt
        .query_map([], |row| {
            Ok(Report {
                id: row.get(0)?,
                report: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reports)
}

/// Load a report with its team results and their player lines, in
/// insertion order.
pub fn get_report(conn: &Connection, id: i64) -> StoreResult<Option<ReportDetail>> {
    let report = conn
        .query_row(
            "SELECT id, report FROM reports WHERE id = ?1",
            params![id],
            |row| {
                Ok(Report {
                    id: row.get(0)?,
                    report: row.get(1)?,
                })
            },
        )
        .optional()?;
    let Some(report) = report else {
        return Ok(None);
    };

    let mut team_stmt = conn.prepare(
        "SELECT id, report_id, team, result FROM team_results
         WHERE report_id = ?1 ORDER BY id",
    )?;
    let teams = team_stmt
        .query_map(params![id], |row| {
            Ok(TeamResult {
                id: row.get(0)?,
                report_id: row.get(1)?,
                team: row.get(2)?,
                result: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stat_stmt = conn.prepare(
        "SELECT id, team_result_id, backnumber, player,
                offense_rebound, defense_rebound, total_rebound,
                assist, steal, block,
                score_1q, score_2q, score_3q, score_4q, score_ot, score_total
         FROM player_stats WHERE team_result_id = ?1 ORDER BY id",
    )?;
    let mut team_results = Vec::with_capacity(teams.len());
    for team_result in teams {
        let player_stats = stat_stmt
            .query_map(params![team_result.id], player_stat_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        team_results.push(TeamResultDetail {
            team_result,
            player_stats,
        });
    }

    Ok(Some(ReportDetail {
        report,
        team_results,
    }))
}

/// Team results and player lines are removed by cascade.
pub fn delete_report(conn: &Connection, id: i64) -> StoreResult<bool> {
    let rows = conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::migrated_pool;

    fn line(backnumber: i64, player: &str) -> PlayerLine {
        PlayerLine {
            backnumber,
            player: player.to_string(),
            assist: Some(3),
            score_total: Some(12),
            ..Default::default()
        }
    }

    #[test]
    fn builds_three_level_tree() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();

        let report = create_report(&conn, "Final, 2024-03-01").unwrap();
        let home = create_team_result(&conn, report.id, "Hawks", "W").unwrap();
        let away = create_team_result(&conn, report.id, "Owls", "L").unwrap();
        create_player_stat(&conn, home.id, &line(7, "Lee")).unwrap();
        create_player_stat(&conn, home.id, &line(11, "Park")).unwrap();
        create_player_stat(&conn, away.id, &line(4, "Choi")).unwrap();

        let detail = get_report(&conn, report.id).unwrap().unwrap();
        assert_eq!(detail.report, report);
        assert_eq!(detail.team_results.len(), 2);
        assert_eq!(detail.team_results[0].team_result, home);
        assert_eq!(detail.team_results[0].player_stats.len(), 2);
        assert_eq!(detail.team_results[0].player_stats[1].line, line(11, "Park"));
        assert_eq!(detail.team_results[1].player_stats[0].team_result_id, away.id);
        assert_eq!(detail.team_results[1].player_stats[0].line.steal, None);
    }

    #[test]
    fn missing_report_is_none() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(get_report(&conn, 1).unwrap().is_none());
    }

    #[test]
    fn team_result_requires_live_report() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();
        assert!(create_team_result(&conn, 77, "Hawks", "W").is_err());
        assert!(create_player_stat(&conn, 77, &line(1, "ghost")).is_err());
    }

    #[test]
    fn delete_cascades_to_children() {
        let (pool, _tmp) = migrated_pool();
        let conn = pool.get().unwrap();

        let report = create_report(&conn, "r").unwrap();
        let team = create_team_result(&conn, report.id, "Hawks", "W").unwrap();
        create_player_stat(&conn, team.id, &line(7, "Lee")).unwrap();

        assert!(delete_report(&conn, report.id).unwrap());
        assert!(!delete_report(&conn, report.id).unwrap());

        let stats: i64 = conn
            .query_row("SELECT COUNT(*) FROM player_stats", [], |row| row.get(0))
            .unwrap();
        let teams: i64 = conn
            .query_row("SELECT COUNT(*) FROM team_results", [], |row| row.get(0))
            .unwrap();
        assert_eq!((teams, stats), (0, 0));
        assert!(list_reports(&conn).unwrap().is_empty());
    }
}
