/// Check if a word is a common stop word
pub fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by" |
        "a" | "an" | "is" | "are" | "was" | "were" | "be" | "been" | "have" | "has" | "had" |
        "do" | "does" | "did" | "will" | "would" | "could" | "should" | "may" | "might" | "must" |
        "can" | "this" | "that" | "these" | "those" | "as" | "its" | "it" | "from" | "after" |
        "into" | "over" | "amid" | "says" | "said" | "new" | "how" | "why" | "what" | "who"
    )
}

/// First `count` significant words of a title, in order, without repeats.
pub fn significant_keywords(title: &str, count: usize) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::with_capacity(count);

    for word in title.to_lowercase().split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() <= 2 || is_stop_word(word) {
            continue;
        }
        if keywords.iter().any(|k| k == word) {
            continue;
        }
        keywords.push(word.to_string());
        if keywords.len() == count {
            break;
        }
    }

    keywords
}

/// Text processing utilities
pub mod text {
    /// Lowercased text reduced to alphanumeric words separated by single
    /// spaces, padded so that phrase lookups only match on word boundaries.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct NormalizedText {
        padded: String,
    }

    impl NormalizedText {
        pub fn new(raw: &str) -> Self {
            let mut padded = String::with_capacity(raw.len() + 2);
            padded.push(' ');
            let mut last_was_space = true;

            for c in raw.chars().flat_map(char::to_lowercase) {
                if c.is_alphanumeric() {
                    padded.push(c);
                    last_was_space = false;
                } else if !last_was_space {
                    padded.push(' ');
                    last_was_space = true;
                }
            }
            if !last_was_space {
                padded.push(' ');
            }

            Self { padded }
        }

        /// Whole-word, case-insensitive phrase match.
        pub fn contains(&self, phrase: &str) -> bool {
            let needle = Self::new(phrase);
            if needle.is_empty() {
                return false;
            }
            self.padded.contains(&needle.padded)
        }

        pub fn is_empty(&self) -> bool {
            self.padded.trim().is_empty()
        }

        pub fn as_str(&self) -> &str {
            self.padded.trim()
        }

        /// Terms from `terms` that occur in this text, in dictionary order.
        pub fn matching<'a>(&self, terms: &'a [String]) -> Vec<&'a str> {
            terms
                .iter()
                .filter(|term| self.contains(term))
                .map(String::as_str)
                .collect()
        }

        /// Whole-word occurrences of `phrase`; adjacent repeats each count.
        pub fn occurrences(&self, phrase: &str) -> usize {
            let needle = Self::new(phrase);
            if needle.is_empty() {
                return 0;
            }
            let pattern = needle.padded.as_str();
            let mut count = 0;
            let mut start = 0;
            while let Some(pos) = self.padded[start..].find(pattern) {
                count += 1;
                // Resume on the trailing space so it can open the next match.
                start += pos + pattern.len() - 1;
            }
            count
        }

        /// Total occurrences of every term in `terms`.
        pub fn count_matching(&self, terms: &[String]) -> usize {
            terms.iter().map(|term| self.occurrences(term)).sum()
        }

        pub fn contains_any(&self, terms: &[String]) -> bool {
            terms.iter().any(|term| self.contains(term))
        }
    }

    /// Extract clean text content from HTML
    pub fn strip_html(html: &str) -> String {
        let text = html
            .chars()
            .fold((String::new(), false), |(mut text, in_tag), c| match c {
                '<' => (text, true),
                '>' => {
                    text.push(' ');
                    (text, false)
                }
                _ if !in_tag => {
                    text.push(c);
                    (text, in_tag)
                }
                _ => (text, in_tag),
            })
            .0;

        decode_entities(&text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn decode_entities(text: &str) -> String {
        text.replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&#8217;", "'")
            .replace("&#8216;", "'")
            .replace("&#8220;", "\"")
            .replace("&#8221;", "\"")
    }

    /// Truncate text to a maximum length, trying to break at sentence boundaries
    pub fn smart_truncate(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            return text.to_string();
        }

        let truncated: String = text.chars().take(max_length).collect();
        if let Some(last_sentence) = truncated.rfind('.') {
            truncated[..last_sentence + 1].to_string()
        } else if let Some(last_space) = truncated.rfind(' ') {
            format!("{}...", &truncated[..last_space])
        } else {
            format!("{}...", truncated)
        }
    }
}

/// Headline cleanup used for matching stories across sources
pub mod title {
    const PUBLISHER_SEPARATORS: [&str; 4] = [" - ", " \u{2013} ", " \u{2014} ", " | "];
    const URGENT_PREFIXES: [&str; 7] = [
        "breaking news:",
        "breaking:",
        "just in:",
        "exclusive:",
        "update:",
        "developing:",
        "watch:",
    ];

    /// Split `"Headline - Publisher"` into its parts. The tail only counts as a
    /// publisher when it is short (at most five words, 40 chars).
    pub fn split_publisher_suffix(title: &str) -> (&str, Option<&str>) {
        let split_at = PUBLISHER_SEPARATORS
            .iter()
            .filter_map(|sep| title.rfind(sep).map(|pos| (pos, sep.len())))
            .max_by_key(|(pos, _)| *pos);

        if let Some((pos, sep_len)) = split_at {
            let head = title[..pos].trim();
            let tail = title[pos + sep_len..].trim();
            let tail_words = tail.split_whitespace().count();
            if !head.is_empty() && !tail.is_empty() && tail_words <= 5 && tail.len() <= 40 {
                return (head, Some(tail));
            }
        }

        (title.trim(), None)
    }

    /// Lowercase headline with urgency prefixes and publisher suffixes removed.
    pub fn clean_title(title: &str) -> String {
        let mut current = title.trim().to_lowercase();

        loop {
            let before = current.len();
            for prefix in URGENT_PREFIXES {
                if let Some(rest) = current.strip_prefix(prefix) {
                    current = rest.trim_start().to_string();
                }
            }
            if let (head, Some(_)) = split_publisher_suffix(&current) {
                current = head.to_string();
            }
            if current.len() == before {
                break;
            }
        }

        current
            .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Hosts whose links point at the aggregator rather than the publisher.
    pub const AGGREGATOR_HOSTS: [&str; 4] = [
        "news.google.com",
        "feedproxy.google.com",
        "www.bing.com",
        "cryptopanic.com",
    ];

    /// Extract domain from URL, without a leading `www.`
    pub fn extract_domain(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let domain = url.domain()?;
        Some(domain.trim_start_matches("www.").to_string())
    }

    /// Validate RSS feed URL format
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }

    /// Comparison key for a link: query string and fragment dropped, trailing
    /// slash trimmed, host lowercased.
    pub fn normalize_url(url_str: &str) -> String {
        let trimmed = url_str.trim();
        match Url::parse(trimmed) {
            Ok(mut url) => {
                url.set_query(None);
                url.set_fragment(None);
                let mut normalized = url.to_string();
                while normalized.ends_with('/') && normalized.matches('/').count() > 3 {
                    normalized.pop();
                }
                normalized
            }
            Err(_) => {
                let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
                trimmed[..end].trim_end_matches('/').to_lowercase()
            }
        }
    }

    pub fn is_aggregator_link(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => url
                .host_str()
                .map(|host| AGGREGATOR_HOSTS.contains(&host))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Publisher URL carried in the aggregator link itself (`?url=` style),
    /// which needs no network round trip.
    pub fn embedded_target(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "url" || key == "u")
            .map(|(_, value)| value.into_owned())
            .filter(|target| is_valid_feed_url(target) && !is_aggregator_link(target))
    }
}

/// Edit-distance based string similarity
pub mod similarity {
    /// Levenshtein distance over chars.
    pub fn levenshtein(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.is_empty() {
            return b.len();
        }
        if b.is_empty() {
            return a.len();
        }

        let mut previous: Vec<usize> = (0..=b.len()).collect();
        let mut current = vec![0; b.len() + 1];

        for (i, ca) in a.iter().enumerate() {
            current[0] = i + 1;
            for (j, cb) in b.iter().enumerate() {
                let substitution = previous[j] + usize::from(ca != cb);
                current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[b.len()]
    }

    /// `1 - distance / max_len`, in `0.0..=1.0`. Two empty strings are identical.
    pub fn normalized_similarity(a: &str, b: &str) -> f64 {
        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            return 1.0;
        }
        1.0 - levenshtein(a, b) as f64 / max_len as f64
    }

    /// Share of keywords in common, relative to the longer list.
    pub fn keyword_overlap(a: &[String], b: &[String]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let shared = a.iter().filter(|word| b.contains(word)).count();
        shared as f64 / a.len().max(b.len()) as f64
    }
}
