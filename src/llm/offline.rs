use async_trait::async_trait;

use super::{normalize_ratio, GenerationError, TaskGenerator};

/// Deterministic generator that needs no network. Useful in tests and when no
/// endpoint is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateGenerator {
    /// Ratios at or above this use the work-weighted templates
    pub work_threshold: f64,
    /// Work-weighted lists below this ratio get break reminders
    pub break_below: f64,
    /// Life-weighted lists above this ratio get a little project work
    pub work_above: f64,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        TemplateGenerator {
            work_threshold: 0.5,
            break_below: 0.8,
            work_above: 0.2,
        }
    }
}

impl TemplateGenerator {
    pub fn tasks_for(&self, project: &str, ratio: f64) -> Vec<String> {
        // One task per line, so the project must not bring its own line breaks
        let project = project.split_whitespace().collect::<Vec<_>>().join(" ");
        let ratio = normalize_ratio(ratio);

        if ratio >= self.work_threshold {
            let mut tasks = vec![
                format!("Research best practices for {project}"),
                format!("Create a project plan for {project}"),
                format!("Schedule a meeting with stakeholders about {project}"),
                format!("Document requirements for {project}"),
                format!("Set up development environment for {project}"),
            ];
            if ratio < self.break_below {
                tasks.push("Take a 15-minute break every 2 hours".to_string());
                tasks.push("Schedule time for lunch away from your desk".to_string());
            }
            tasks
        } else {
            let mut tasks = vec![
                format!("Brainstorm ideas for {project} (30 minutes max)"),
                "Take a 30-minute walk outside".to_string(),
                "Practice mindfulness meditation for 10 minutes".to_string(),
                "Plan a fun activity for the evening".to_string(),
                "Check in with a friend or family member".to_string(),
            ];
            if ratio > self.work_above {
                tasks.push(format!("Review progress on {project}"));
                tasks.push(format!("Identify one small task to complete for {project}"));
            }
            tasks
        }
    }
}

#[async_trait]
impl TaskGenerator for TemplateGenerator {
    async fn generate(&self, project: &str, ratio: f64) -> Result<Vec<String>, GenerationError> {
        log::debug!("TemplateGenerator: project={:?} ratio={}", project, ratio);
        Ok(self.tasks_for(project, ratio))
    }
}
