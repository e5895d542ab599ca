//! Approximate name matching for podcast and user search.
//!
//! Resolution happens in two steps. An exact, case- and accent-sensitive
//! match wins outright and is reported at 100%. Otherwise both sides are
//! transliterated to lower-case ASCII and compared by Levenshtein distance
//! normalised by the longer string; candidates within the threshold are
//! returned best-first.

use serde::Serialize;

use crate::{Error, Result, podcast::Podcast, user::User};

/// Maximum accepted normalised distance.
pub const DEFAULT_THRESHOLD: f64 = 0.45;

/// Anything searchable by display name.
pub trait Named {
  fn name(&self) -> &str;
}

impl Named for Podcast {
  fn name(&self) -> &str { &self.name }
}

impl Named for User {
  fn name(&self) -> &str { &self.username }
}

impl<T: Named> Named for &T {
  fn name(&self) -> &str { (**self).name() }
}

/// A corpus entry together with how closely it matched the query.
#[derive(Debug, Clone, Serialize)]
pub struct Scored<T> {
  #[serde(flatten)]
  pub item:             T,
  /// `0.0..=100.0`, rounded to two decimals.
  pub match_percentage: f64,
}

/// Drop symbols such as emoji, strip diacritics (by ASCII transliteration),
/// and lower-case.
pub fn normalize(s: &str) -> String {
  let kept: String = s
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation())
    .collect();
  deunicode::deunicode(&kept).to_lowercase()
}

/// Levenshtein distance divided by the length of the longer string, in
/// characters. Two empty strings are identical; an empty string against a
/// non-empty one is maximally distant.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
  let longest = a.chars().count().max(b.chars().count());
  if longest == 0 {
    return 0.0;
  }
  strsim::levenshtein(a, b) as f64 / longest as f64
}

/// `round((1 - distance) * 100, 2)`.
pub fn match_percentage(distance: f64) -> f64 {
  ((1.0 - distance) * 10_000.0).round() / 100.0
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
  threshold: f64,
}

impl Default for Matcher {
  fn default() -> Self { Self { threshold: DEFAULT_THRESHOLD } }
}

impl Matcher {
  pub fn new(threshold: f64) -> Self { Self { threshold } }

  pub fn threshold(&self) -> f64 { self.threshold }

  /// Resolve `query` against `corpus`.
  ///
  /// Returns [`Error::NoMatchFound`] when the corpus is empty or nothing is
  /// within the threshold. Fuzzy results are ordered by descending
  /// percentage, then ascending distance, then name, then corpus order, so
  /// identical inputs always produce an identical ordering.
  pub fn search<T: Named>(
    &self,
    query: &str,
    corpus: impl IntoIterator<Item = T>,
  ) -> Result<Vec<Scored<T>>> {
    let mut corpus: Vec<T> = corpus.into_iter().collect();

    if let Some(pos) = corpus.iter().position(|c| c.name() == query) {
      let item = corpus.swap_remove(pos);
      tracing::debug!(query, "exact match");
      return Ok(vec![Scored { item, match_percentage: 100.0 }]);
    }

    let plain_query = normalize(query);
    let mut hits: Vec<(usize, f64, f64, T)> = corpus
      .into_iter()
      .enumerate()
      .filter_map(|(idx, item)| {
        let d = normalized_distance(&normalize(item.name()), &plain_query);
        (d <= self.threshold).then(|| (idx, d, match_percentage(d), item))
      })
      .collect();

    tracing::debug!(query, hits = hits.len(), "fuzzy search");
    if hits.is_empty() {
      return Err(Error::NoMatchFound);
    }

    hits.sort_by(|a, b| {
      b.2
        .total_cmp(&a.2)
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.3.name().cmp(b.3.name()))
        .then_with(|| a.0.cmp(&b.0))
    });

    Ok(
      hits
        .into_iter()
        .map(|(_, _, match_percentage, item)| Scored { item, match_percentage })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Name(&'static str);

  impl Named for Name {
    fn name(&self) -> &str { self.0 }
  }

  fn corpus(names: &[&'static str]) -> Vec<Name> {
    names.iter().copied().map(Name).collect()
  }

  fn names(results: &[Scored<Name>]) -> Vec<&'static str> {
    results.iter().map(|s| s.item.0).collect()
  }

  #[test]
  fn normalize_strips_case_and_accents() {
    assert_eq!(normalize("Música Clásica"), "musica clasica");
    assert_eq!(normalize("François"), "francois");
    assert_eq!(normalize("plain"), "plain");
    assert_eq!(normalize("Straße"), "strasse");
  }

  #[test]
  fn normalize_drops_symbols() {
    assert_eq!(normalize("🎙 pod"), " pod");
    assert_eq!(normalize("Rock & Roll ♪"), "rock & roll ");
  }

  #[test]
  fn emoji_do_not_match_their_names() {
    let c = corpus(&["🎙 pod"]);
    assert!(Matcher::default().search("microphone pod", c).is_err());
  }

  #[test]
  fn distance_edge_cases() {
    assert_eq!(normalized_distance("", ""), 0.0);
    assert_eq!(normalized_distance("", "abc"), 1.0);
    assert_eq!(normalized_distance("abc", ""), 1.0);
    assert_eq!(normalized_distance("abc", "abc"), 0.0);
    assert!((normalized_distance("kitten", "sitting") - 3.0 / 7.0).abs() < 1e-12);
  }

  #[test]
  fn percentage_rounds_to_two_decimals() {
    assert_eq!(match_percentage(3.0 / 23.0), 86.96);
    assert_eq!(match_percentage(7.0 / 20.0), 65.0);
    assert_eq!(match_percentage(0.0), 100.0);
    assert_eq!(match_percentage(2.0 / 12.0), 83.33);
  }

  #[test]
  fn fuzzy_podcast_names() {
    let c = corpus(&["Programming for dummies", "Programming for fun", "Cooking master"]);
    let results = Matcher::default().search("Programin for dumies", c).unwrap();

    assert_eq!(names(&results), vec!["Programming for dummies", "Programming for fun"]);
    assert_eq!(results[0].match_percentage, 86.96);
    assert_eq!(results[1].match_percentage, 65.0);
  }

  #[test]
  fn exact_match_wins_over_near_duplicates() {
    let c = corpus(&["Carlos Latre", "Carl Sagan", "carl sagan"]);
    let results = Matcher::default().search("Carl Sagan", c).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item, Name("Carl Sagan"));
    assert_eq!(results[0].match_percentage, 100.0);
  }

  #[test]
  fn exact_match_is_case_sensitive() {
    let c = corpus(&["Carl Sagan"]);
    let results = Matcher::default().search("carl sagan", c).unwrap();

    // Found, but through the fuzzy path.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_percentage, 100.0);
  }

  #[test]
  fn accents_are_ignored_by_fuzzy_step() {
    let c = corpus(&["Música para todos"]);
    let results = Matcher::default().search("musica para todos", c).unwrap();
    assert_eq!(results[0].match_percentage, 100.0);
  }

  #[test]
  fn usernames_ranked_best_first() {
    let c = corpus(&["Carlos Latre", "Andreu Buenafuente", "Carl Sagan"]);
    let results = Matcher::default().search("Carlos Sagan", c).unwrap();

    assert_eq!(names(&results), vec!["Carl Sagan", "Carlos Latre"]);
    assert_eq!(results[0].match_percentage, 83.33);
    assert_eq!(results[1].match_percentage, 66.67);
  }

  #[test]
  fn nothing_close_enough() {
    let c = corpus(&["Carl Sagan", "Carlos Latre"]);
    let err = Matcher::default().search("Pirlo", c).unwrap_err();
    assert!(matches!(err, Error::NoMatchFound));
  }

  #[test]
  fn empty_corpus_has_no_match() {
    let err = Matcher::default().search("anything", Vec::<Name>::new()).unwrap_err();
    assert!(matches!(err, Error::NoMatchFound));
  }

  #[test]
  fn threshold_is_inclusive() {
    // "abcdefghij" vs "abcdeXXXXj": 4 substitutions over 10 chars.
    let c = corpus(&["abcdefghij"]);
    assert!(Matcher::new(0.4).search("abcdeXXXXj", c.clone()).is_ok());
    assert!(Matcher::new(0.39).search("abcdeXXXXj", c).is_err());
  }

  #[test]
  fn default_threshold_boundary() {
    let c = corpus(&["abcdefghijklmnopqrst"]);

    // Nine substitutions over twenty characters: exactly 0.45.
    let hits = Matcher::default().search("xxxxxxxxxjklmnopqrst", c.clone()).unwrap();
    assert_eq!(hits[0].match_percentage, 55.0);

    // Ten substitutions: 0.5.
    let err = Matcher::default().search("xxxxxxxxxxklmnopqrst", c).unwrap_err();
    assert!(matches!(err, Error::NoMatchFound));
  }

  #[test]
  fn ties_broken_by_name_and_repeatable() {
    // Every candidate is three substitutions away from the query.
    let c = corpus(&["bbbx", "aaax", "cccx"]);
    let first = Matcher::new(1.0).search("dddx", c.clone()).unwrap();
    let second = Matcher::new(1.0).search("dddx", c).unwrap();

    assert_eq!(names(&first), vec!["aaax", "bbbx", "cccx"]);
    assert_eq!(names(&first), names(&second));
  }

  #[test]
  fn closer_candidates_never_rank_lower() {
    let results = Matcher::new(1.0)
      .search("podcost", corpus(&["podcast zeta", "podcasts", "podcast"]))
      .unwrap();
    assert_eq!(names(&results), vec!["podcast", "podcasts", "podcast zeta"]);
    assert!(results.windows(2).all(|w| w[0].match_percentage >= w[1].match_percentage));
  }
}
