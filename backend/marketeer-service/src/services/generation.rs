/// Post generation: prompt building and completion parsing
///
/// One parametrized module builds the instruction prompt from the product
/// brief and parses the completion back into at most five short posts. The
/// primary parser scans for `N.`-numbered lines; when it finds fewer than
/// three usable entries, a looser line-splitting fallback takes over.
use crate::clients::llm::CompletionProvider;
use crate::error::AppError;
use crate::metrics;
use crate::models::POST_TEXT_LIMIT;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Generation batch cap
pub const MAX_POSTS_PER_BATCH: usize = 5;
/// Fragments at or below this many characters are discarded as noise
const MIN_FRAGMENT_CHARS: usize = 10;
/// Below this many primary results the loose fallback parser runs
const MIN_PRIMARY_RESULTS: usize = 3;

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*(.+)$").expect("valid numbered-line regex"));
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("valid leading-number regex"));
static CATEGORY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\[.*?\]\*\*").expect("valid category-tag regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static LEADING_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[.*?\]\s*").expect("valid leading-bracket regex"));

/// Product fields that parametrize the prompt
#[derive(Debug, Clone, Default)]
pub struct ProductBrief {
    pub product_name: String,
    pub description: String,
    pub target_audience: Option<String>,
    pub key_features: Vec<String>,
    pub tone_preference: Option<String>,
    pub custom_tone: Option<String>,
    pub handle: Option<String>,
}

impl ProductBrief {
    /// Custom tone wins when non-empty, then the preset, then "friendly"
    pub fn effective_tone(&self) -> &str {
        if let Some(custom) = self.custom_tone.as_deref() {
            let custom = custom.trim();
            if !custom.is_empty() {
                return custom;
            }
        }
        if let Some(preset) = self.tone_preference.as_deref() {
            let preset = preset.trim();
            if !preset.is_empty() {
                return preset;
            }
        }
        "friendly"
    }

    /// Comma-separated audience string, quotes stripped, defaulting to
    /// developers
    pub fn audience_list(&self) -> Vec<String> {
        let audiences: Vec<String> = self
            .target_audience
            .as_deref()
            .unwrap_or("")
            .replace(['\'', '"'], "")
            .split(',')
            .map(str::trim)
            .filter(|audience| !audience.is_empty())
            .map(str::to_string)
            .collect();

        if audiences.is_empty() {
            vec!["developers".to_string()]
        } else {
            audiences
        }
    }

    pub fn features_text(&self) -> String {
        if self.key_features.is_empty() {
            "innovative features".to_string()
        } else {
            self.key_features.join(", ")
        }
    }
}

/// Render the build-in-public instruction prompt for the completion call
pub fn build_prompt(brief: &ProductBrief) -> String {
    let audience = brief.audience_list().join(", ");
    let tone = brief.effective_tone();
    let features = brief.features_text();
    let handle_line = brief
        .handle
        .as_deref()
        .map(|handle| format!("- Your handle: @{}\n", handle))
        .unwrap_or_default();

    format!(
        "# Build-in-Public Post Generator\n\
         \n\
         You are an indie maker documenting the journey of building **{name}** in\n\
         public. Your audience is {audience} and you write with a {tone} tone.\n\
         \n\
         ## Product context\n\
         - Product: {name}\n\
         - What it does: {description}\n\
         - Key features: {features}\n\
         - Target users: {audience}\n\
         {handle_line}\
         \n\
         ## Voice\n\
         - Raw, conversational, lowercase-casual; caps only for emotional peaks\n\
         - No corporate speak, no buzzwords, no announcement language\n\
         - Pain-first storytelling: start with the struggle, end with the lesson\n\
         - Specific, realistic numbers beat vague claims\n\
         - Honest about failures; excited about small wins\n\
         \n\
         ## Post shapes to draw from\n\
         1. Daily progress check-in with two or three bullet points and an outcome\n\
         2. Milestone moment, told like telling a friend\n\
         3. Honest struggle, specific about what is not working\n\
         4. Insight or hot take learned from building {name}\n\
         5. Community question you genuinely want answered\n\
         \n\
         ## Rules\n\
         - Reference {name} naturally as part of the story, never as a pitch\n\
         - No links, no CTAs, no hashtags, no unnecessary mentions\n\
         - Keep each post under 280 characters\n\
         \n\
         ## Output format\n\
         Generate 5 posts. Return ONLY the post content, one per line, numbered:\n\
         \n\
         1. [post content]\n\
         2. [post content]\n\
         3. [post content]\n\
         4. [post content]\n\
         5. [post content]\n\
         \n\
         No markdown formatting, no category labels, no asterisks - just clean\n\
         post text.",
        name = brief.product_name,
        audience = audience,
        tone = tone,
        description = brief.description,
        features = features,
        handle_line = handle_line,
    )
}

/// Strip residual markdown decoration from a parsed fragment
fn strip_formatting(text: &str) -> String {
    let text = CATEGORY_TAG.replace_all(text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = LEADING_BRACKET.replace_all(&text, "");
    text.trim().to_string()
}

/// Primary parser: lines starting with an `N.` marker
pub fn parse_numbered(content: &str) -> Vec<String> {
    let mut posts = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = NUMBERED_LINE.captures(line) {
            let post = strip_formatting(captures[1].trim());
            if post.chars().count() > MIN_FRAGMENT_CHARS {
                posts.push(post);
            }
        }
    }

    posts.truncate(MAX_POSTS_PER_BATCH);
    posts
}

/// Looser fallback: treat every line as a candidate, stripping any leading
/// number marker
pub fn parse_loose(content: &str) -> Vec<String> {
    let mut posts = Vec::new();

    for line in content.lines() {
        let line = LEADING_NUMBER.replace(line.trim(), "");
        let post = strip_formatting(&line);
        if post.chars().count() > MIN_FRAGMENT_CHARS {
            posts.push(post);
        }
    }

    posts.truncate(MAX_POSTS_PER_BATCH);
    posts
}

/// Parse a completion, falling back to loose splitting when the numbered
/// parse comes up short. The fallback wins only when it finds at least
/// three entries.
pub fn parse_completion(content: &str) -> Vec<String> {
    let primary = parse_numbered(content);
    if primary.len() >= MIN_PRIMARY_RESULTS {
        return primary;
    }

    let fallback = parse_loose(content);
    if fallback.len() >= MIN_PRIMARY_RESULTS {
        fallback
    } else {
        primary
    }
}

/// Truncate text to the network's post length limit
pub fn clamp_to_post_limit(text: &str) -> String {
    if text.chars().count() <= POST_TEXT_LIMIT {
        text.to_string()
    } else {
        text.chars().take(POST_TEXT_LIMIT).collect()
    }
}

/// Run one completion for the brief and parse the result into at most five
/// post texts, each clamped to the post length limit.
pub async fn generate_posts(
    provider: &dyn CompletionProvider,
    brief: &ProductBrief,
) -> Result<Vec<String>, AppError> {
    let prompt = build_prompt(brief);
    let content = provider.complete(&prompt).await?;

    let posts: Vec<String> = parse_completion(&content)
        .iter()
        .map(|post| clamp_to_post_limit(post))
        .collect();

    debug!(count = posts.len(), "parsed generated posts");
    metrics::GENERATED_POSTS.inc_by(posts.len() as u64);

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::llm::MockCompletionProvider;

    fn brief() -> ProductBrief {
        ProductBrief {
            product_name: "Acme".to_string(),
            description: "ships widgets faster".to_string(),
            target_audience: Some("'devs', \"founders\"".to_string()),
            key_features: vec!["fast builds".to_string(), "zero config".to_string()],
            tone_preference: Some("witty".to_string()),
            custom_tone: None,
            handle: Some("acmehq".to_string()),
        }
    }

    #[test]
    fn test_parse_numbered_extracts_five_in_order() {
        let content = "Here are your posts:\n\
                       1. day 12 of building this thing, auth finally works\n\
                       2. shipped the onboarding flow, lost two users anyway\n\
                       3. hot take: most landing pages say nothing at all\n\
                       4. broke prod for 40 minutes and nobody noticed\n\
                       5. what is the one tool you refuse to give up?\n";

        let posts = parse_numbered(content);
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0], "day 12 of building this thing, auth finally works");
        assert_eq!(posts[4], "what is the one tool you refuse to give up?");
    }

    #[test]
    fn test_parse_numbered_strips_markdown_decoration() {
        let content = "1. **[Milestone]** finally crossed 100 users today\n\
                       2. [Progress] **shipped** the *new* editor\n";

        let posts = parse_numbered(content);
        assert_eq!(posts[0], "finally crossed 100 users today");
        assert_eq!(posts[1], "shipped the new editor");
    }

    #[test]
    fn test_parse_numbered_discards_short_fragments() {
        let content = "1. too short\n2. this one is long enough to keep around\n";
        let posts = parse_numbered(content);
        assert_eq!(posts, vec!["this one is long enough to keep around"]);
    }

    #[test]
    fn test_parse_numbered_caps_at_five() {
        let content = (1..=8)
            .map(|n| format!("{}. entry number {} with plenty of characters", n, n))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_numbered(&content).len(), 5);
    }

    #[test]
    fn test_fallback_kicks_in_for_unnumbered_output() {
        let content = "day 12 of building this thing, auth finally works\n\
                       shipped the onboarding flow, lost two users anyway\n\
                       hot take: most landing pages say nothing at all\n";

        let posts = parse_completion(content);
        assert_eq!(posts.len(), 3);
        assert_eq!(
            posts[0],
            "day 12 of building this thing, auth finally works"
        );
    }

    #[test]
    fn test_short_fallback_keeps_primary_result() {
        // Fallback finds fewer than three entries, so the (also short)
        // primary result wins.
        let content = "1. a perfectly reasonable post about building\nnoise\nmore";
        let posts = parse_completion(content);
        assert_eq!(posts, vec!["a perfectly reasonable post about building"]);
    }

    #[test]
    fn test_clamp_to_post_limit() {
        let long = "x".repeat(400);
        assert_eq!(clamp_to_post_limit(&long).chars().count(), 280);
        assert_eq!(clamp_to_post_limit("short"), "short");
    }

    #[test]
    fn test_effective_tone_preference_order() {
        let mut b = brief();
        assert_eq!(b.effective_tone(), "witty");

        b.custom_tone = Some("  deadpan  ".to_string());
        assert_eq!(b.effective_tone(), "deadpan");

        b.custom_tone = Some("   ".to_string());
        assert_eq!(b.effective_tone(), "witty");

        b.custom_tone = None;
        b.tone_preference = None;
        assert_eq!(b.effective_tone(), "friendly");
    }

    #[test]
    fn test_audience_list_strips_quotes_and_defaults() {
        let b = brief();
        assert_eq!(b.audience_list(), vec!["devs", "founders"]);

        let empty = ProductBrief::default();
        assert_eq!(empty.audience_list(), vec!["developers"]);
    }

    #[test]
    fn test_prompt_carries_product_context() {
        let prompt = build_prompt(&brief());
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("ships widgets faster"));
        assert!(prompt.contains("fast builds, zero config"));
        assert!(prompt.contains("devs, founders"));
        assert!(prompt.contains("witty"));
        assert!(prompt.contains("@acmehq"));
        assert!(prompt.contains("Generate 5 posts"));
    }

    #[tokio::test]
    async fn test_generate_posts_clamps_and_parses() {
        let mut provider = MockCompletionProvider::new();
        let long_tail = "y".repeat(400);
        let completion = format!(
            "1. first post with enough substance to keep\n\
             2. second post also long enough to keep\n\
             3. {}\n",
            long_tail
        );
        provider
            .expect_complete()
            .returning(move |_| Ok(completion.clone()));

        let posts = generate_posts(&provider, &brief()).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|post| post.chars().count() <= 280));
    }
}
