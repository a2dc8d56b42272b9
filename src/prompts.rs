//! Prompt text for the language-model calls.

use crate::model::{KeywordTrend, Paper};

pub fn keyword_extraction(paper: &Paper, max_keywords: usize, max_words: usize) -> String {
    format!(
        r#"Analyze the given research paper and extract up to {max_keywords} of the most relevant keywords/keyphrases covering:
* Research methodology and approaches
* Core technical concepts and technologies
* Application domains and use cases
* Key findings or contributions

Paper Details:
Title: {title}
Abstract: {abstract_text}

Requirements:
* Extract only the most significant keywords/keyphrases (max {max_keywords}).
* Each keyword/keyphrase should be at most {max_words} words.
* Normalize variations (e.g., "ML" and "machine learning" -> "machine learning"; "API" and "APIs" -> "API").
* Output format: return only a comma-separated list (no numbering, no categories).

Example good response: "machine learning, natural language processing, sentiment analysis"
Example bad response: "1. Methodology: machine learning, 2. Technology: natural language processing"
"#,
        title = paper.title,
        abstract_text = paper.abstract_text,
    )
}

/// `yearly` is `(year, abstracts)` in ascending year order.
pub fn research_evolution(topic: &str, yearly: &[(i32, Vec<&str>)]) -> String {
    let years_text = yearly
        .iter()
        .map(|(year, abstracts)| format!("Year {year}:\n{}", abstracts.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze how the research direction has evolved over time for the topic: {topic}\n\n\
         Here are the abstracts grouped by year:\n\n\
         {years_text}\n\n\
         Please provide a comprehensive analysis of how the research focus and approaches have evolved over time. Consider:\n\
         1. Major shifts in research methodology\n\
         2. New techniques or approaches introduced\n\
         3. Changes in the scope or application areas\n\
         4. Emerging challenges or opportunities addressed\n\n\
         Format the response with clear numbering (1. 2. 3.) and line breaks between points."
    )
}

/// One line per trend: "- keyword: first → last".
pub fn trend_deltas(trends: &[KeywordTrend]) -> String {
    trends
        .iter()
        .filter_map(|t| {
            let (first, last) = t.endpoints()?;
            Some(format!(
                "- {}: started at {first} mentions and ended at {last} mentions ({first} → {last})",
                t.keyword
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn trend_summary(topic: &str, time_period: &str, trends: &[KeywordTrend]) -> String {
    let deltas = trend_deltas(trends);
    let trends_text = if deltas.is_empty() {
        "No keyword trends were found for this paper set.".to_string()
    } else {
        deltas
    };

    format!(
        "Analyze these research trends and provide a concise summary:\n\
         Topic: {topic}\n\
         Time period: {time_period}\n\
         Trends:\n\
         {trends_text}\n\n\
         Provide a concise summary of the research trends, focusing on:\n\
         1. Overall direction of the field\n\
         2. Most significant changes in keyword frequency\n\
         3. Emerging or declining topics\n\n\
         Format the response with clear numbering (1. 2. 3.) and line breaks between points."
    )
}
