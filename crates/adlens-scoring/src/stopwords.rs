//! English stopwords excluded from salient-term aggregation.

pub(crate) const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "aren",
    "because", "been", "before", "being", "below", "between", "both", "but", "can", "cannot",
    "could", "couldn", "did", "didn", "does", "doesn", "doing", "don", "down", "during", "each",
    "even", "ever", "every", "few", "for", "from", "further", "had", "hadn", "has", "hasn",
    "have", "haven", "having", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "into", "isn", "its", "itself", "just", "let", "more", "most", "much", "must", "mustn",
    "myself", "nor", "not", "now", "off", "once", "only", "other", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shan", "she", "should", "shouldn", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "too", "under", "until", "upon", "very", "was",
    "wasn", "were", "weren", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "won", "would", "wouldn", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

pub(crate) fn is_stopword(term: &str) -> bool {
    STOPWORDS.contains(&term)
}
