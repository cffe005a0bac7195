use anyhow::{anyhow, Result};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{TantivyDocument, Term};

use kbase_core::traits::LexicalScorer;

use crate::index::Bm25Index;

impl Bm25Index {
	/// BM25 score of every document for the OR of `query_tokens`, indexed by
	/// document position. Non-matching documents score 0.
	pub fn score_all(&self, query_tokens: &[String]) -> Result<Vec<f32>> {
		let mut scores = vec![0.0f32; self.len];
		if query_tokens.is_empty() || self.len == 0 { return Ok(scores); }

		let clauses: Vec<(Occur, Box<dyn Query>)> = query_tokens
			.iter()
			.map(|tok| {
				let term = Term::from_field_text(self.fields.body, tok);
				(Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>)
			})
			.collect();
		let query = BooleanQuery::new(clauses);

		let top_docs = self.searcher.search(&query, &TopDocs::with_limit(self.len))?;
		for (score, addr) in top_docs {
			let doc: TantivyDocument = self.searcher.doc(addr)?;
			let position = doc
				.get_first(self.fields.position)
				.and_then(|v| v.as_u64())
				.ok_or_else(|| anyhow!("bm25 row {:?} has no position", addr))?;
			if let Some(slot) = scores.get_mut(position as usize) { *slot = score; }
		}
		Ok(scores)
	}
}

impl LexicalScorer for Bm25Index {
	fn scores(&self, query_tokens: &[String]) -> Result<Vec<f32>> {
		self.score_all(query_tokens)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kbase_core::traits::tokenize;

	fn corpus() -> Bm25Index {
		Bm25Index::build(&[
			"Доставка. Курьерская доставка по городу, доставка бесплатно",
			"Салон ORTOS Минск. Адрес: ул. Гикало, 1.",
			"Оплата. Карта или наличные",
		])
		.unwrap()
	}

	#[test]
	fn scores_align_with_positions() {
		let idx = corpus();
		let s = idx.score_all(&tokenize("ДОСТАВКА самовывоз")).unwrap();
		assert_eq!(s.len(), 3);
		assert!(s[0] > 0.0);
		assert_eq!(s[1], 0.0);
		assert_eq!(s[2], 0.0);
	}

	#[test]
	fn punctuation_stays_attached_to_tokens() {
		let idx = corpus();
		// "минск." is the token in the location text, bare "минск" is not.
		assert_eq!(idx.score_all(&tokenize("минск")).unwrap()[1], 0.0);
		assert!(idx.score_all(&tokenize("минск.")).unwrap()[1] > 0.0);
	}

	#[test]
	fn more_matching_terms_score_higher() {
		let idx = corpus();
		let one = idx.score_all(&tokenize("карта")).unwrap()[2];
		let two = idx.score_all(&tokenize("карта наличные")).unwrap()[2];
		assert!(two > one);
	}

	#[test]
	fn empty_query_and_empty_index() {
		let idx = corpus();
		assert_eq!(idx.score_all(&[]).unwrap(), vec![0.0; 3]);
		let empty = Bm25Index::build::<&str>(&[]).unwrap();
		assert!(empty.is_empty());
		assert!(empty.scores(&tokenize("x")).unwrap().is_empty());
		assert!(empty.is_available());
	}
}
