use regex::Regex;
use std::sync::OnceLock;

pub const NO_TITLE: &str = "No title";
pub const NO_OBJECTIVES: &str = "No objectives";
pub const NO_SCRIPT: &str = "No script";

/// Lesson plan scraped out of a chat-agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub title: String,
    pub objectives: String,
    pub script: String,
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<title>(.*?)</title>").expect("title pattern"))
}

fn objectives_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<learning_objectives>(.*?)</learning_objectives>")
            .expect("objectives pattern")
    })
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<script>(.*?)</script>").expect("script pattern"))
}

/// Pulls the three tagged regions out of a raw reply. The title match stays
/// on one line; objectives and script may span lines. Missing regions
/// degrade to placeholder text instead of failing.
pub fn extract_lesson(raw: &str) -> Lesson {
    Lesson {
        title: capture(title_re(), raw).unwrap_or_else(|| NO_TITLE.to_string()),
        objectives: capture(objectives_re(), raw).unwrap_or_else(|| NO_OBJECTIVES.to_string()),
        script: capture(script_re(), raw).unwrap_or_else(|| NO_SCRIPT.to_string()),
    }
}

fn capture(re: &Regex, raw: &str) -> Option<String> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_three_regions() {
        let raw = "intro <title>Fractions</title>\n\
                   <learning_objectives>- compare\n- simplify</learning_objectives>\n\
                   <script>Welcome back.\nToday we cover fractions.</script> outro";

        let lesson = extract_lesson(raw);
        assert_eq!(lesson.title, "Fractions");
        assert_eq!(lesson.objectives, "- compare\n- simplify");
        assert_eq!(lesson.script, "Welcome back.\nToday we cover fractions.");
    }

    #[test]
    fn missing_regions_fall_back_to_placeholders() {
        let lesson = extract_lesson("no tags in here");
        assert_eq!(lesson.title, NO_TITLE);
        assert_eq!(lesson.objectives, NO_OBJECTIVES);
        assert_eq!(lesson.script, NO_SCRIPT);
    }

    #[test]
    fn title_does_not_span_lines() {
        let raw = "<title>broken\nacross lines</title>";
        let lesson = extract_lesson(raw);
        assert_eq!(lesson.title, NO_TITLE);
    }

    #[test]
    fn partial_tags_keep_the_rest_working() {
        let raw = "<title>Geometry</title> and nothing else";
        let lesson = extract_lesson(raw);
        assert_eq!(lesson.title, "Geometry");
        assert_eq!(lesson.objectives, NO_OBJECTIVES);
        assert_eq!(lesson.script, NO_SCRIPT);
    }
}
