use super::normalize_ratio;

/// Whole-percent (work, life) split for a ratio.
pub fn balance_split(ratio: f64) -> (u8, u8) {
    let work = (normalize_ratio(ratio) * 100.0).round() as u8;
    (work, 100 - work)
}

pub fn build_prompt(project: &str, ratio: f64) -> String {
    let (work, life) = balance_split(ratio);
    format!(
        "You are a helpful planning assistant. Create a to-do list of 5 to 7 tasks for today.\n\
         \n\
         Project: {project}\n\
         Work-life balance: {work}% work / {life}% life\n\
         \n\
         Match the balance: the higher the work share, the more tasks should move the \
         project forward; the higher the life share, the more tasks should be breaks, \
         exercise, rest or time with other people.\n\
         \n\
         Write exactly one task per line. Do not number the tasks, do not use bullets, \
         and do not add headings, explanations or any other text.",
        project = project.trim(),
    )
}
