use std::path::Path;

use crate::error::Result;
use crate::model::Project;

/// Save a project to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json)?;
    tracing::info!("saved project {} to {}", project.name, path.display());
    Ok(())
}

/// Load a project from a JSON file.
pub fn load_project(path: &Path) -> Result<Project> {
    let json = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&json)?;
    tracing::info!(
        "loaded project {} ({} tasks) from {}",
        project.name,
        project.tasks.len(),
        path.display()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::Task;
    use chrono::NaiveDate;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.gantt.json");
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let mut project = Project::new("Plan");
        let a = Task::new("A", day, day);
        let b = Task::new("B", day, day).depending_on(&[a.id]).with_parent(a.id);
        project.tasks = vec![a, b];

        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.id, project.id);
        assert_eq!(loaded.tasks, project.tasks);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_project(&missing), Err(Error::Io(_))));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ nope").unwrap();
        assert!(matches!(load_project(&garbage), Err(Error::Json(_))));
    }
}
