use super::write_upload;
use crate::cli::ExportArgs;
use crate::config::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use lineforge::core::io::draftkings::SlateIdentifiers;
use lineforge::core::io::runs::{JsonRunStore, RunStore};
use tracing::info;
use uuid::Uuid;

pub fn run(args: ExportArgs) -> Result<()> {
    let run_id = Uuid::parse_str(args.run_id.trim())
        .map_err(|e| CliError::Argument(format!("invalid run id '{}': {e}", args.run_id)))?;
    let runs_dir = args
        .runs_dir
        .unwrap_or_else(|| DefaultsConfig::default().runs_dir);

    info!(%run_id, dir = %runs_dir.display(), "Loading stored run.");
    let record = JsonRunStore::new(&runs_dir).load(run_id)?;

    let ids = match &args.slate {
        Some(path) => SlateIdentifiers::from_path(path)?,
        None => SlateIdentifiers::from_lineups(&record.lineups),
    };
    let written = write_upload(&record.lineups, &ids, &args.output)?;
    println!(
        "Exported {written} of {} lineup(s) from run {run_id} to: {}",
        record.lineups.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineforge::core::io::runs::RunRecord;
    use lineforge::core::models::lineup::{Lineup, Slot};
    use lineforge::core::models::player::{Player, Position};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn stored_lineup() -> Lineup {
        let slots: BTreeMap<Slot, Player> = Slot::ALL
            .iter()
            .enumerate()
            .map(|(i, &slot)| {
                let position = slot.base_position().unwrap_or(Position::WR);
                let mut player = Player::new(format!("Player {i}"), position, "kc", 5000, 10.0);
                player.site_id = Some(format!("{}", 500 + i));
                (slot, player)
            })
            .collect();
        Lineup::new(slots, 90.0)
    }

    #[test]
    fn stored_run_is_re_exported_with_its_own_ids() {
        let dir = tempdir().unwrap();
        let runs_dir = dir.path().join("runs");
        let record = RunRecord {
            run_id: Uuid::new_v4(),
            seed: 1,
            requested: 1,
            lineups: vec![stored_lineup()],
            halted: None,
        };
        JsonRunStore::new(&runs_dir).save(&record).unwrap();

        let output = dir.path().join("upload.csv");
        run(ExportArgs {
            run_id: record.run_id.to_string(),
            output: output.clone(),
            slate: None,
            runs_dir: Some(runs_dir),
        })
        .unwrap();

        let upload = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            upload.lines().nth(1),
            Some("500,501,502,503,504,505,506,507,508")
        );
    }

    #[test]
    fn bad_or_unknown_run_ids_are_errors() {
        let dir = tempdir().unwrap();
        let args = |run_id: String| ExportArgs {
            run_id,
            output: dir.path().join("upload.csv"),
            slate: None,
            runs_dir: Some(dir.path().to_path_buf()),
        };
        assert!(matches!(
            run(args("not-a-uuid".into())),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            run(args(Uuid::new_v4().to_string())),
            Err(CliError::RunStore(_))
        ));
    }
}
