use anyhow::Result;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, TantivyDocument};
use tracing::{debug, info, warn};

use peds_core::error::Error;
use peds_core::traits::KeywordSearch;
use peds_core::types::{ReferencePage, Relationship, SearchHit};

use crate::tantivy_utils::{build_schema, register_tokenizer};

/// BM25 keyword channel over reference pages.
pub struct TantivyIndexer {
	index: Index,
	reader: IndexReader,
	title_field: Field,
	page_field: Field,
	text_field: Field,
	relationships_field: Field,
}

impl TantivyIndexer {
	/// Create a fresh index, wiping whatever was in `index_dir`.
	pub fn create(index_dir: &Path) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(index_dir)?; }
		std::fs::create_dir_all(index_dir)?;
		let index = Index::create_in_dir(index_dir, build_schema())?;
		Self::from_index(index)
	}

	pub fn open(index_dir: &Path) -> Result<Self> {
		let index = Index::open_in_dir(index_dir)?;
		Self::from_index(index)
	}

	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let schema = index.schema();
		let title_field = schema.get_field("title")?;
		let page_field = schema.get_field("page_number")?;
		let text_field = schema.get_field("original_text")?;
		let relationships_field = schema.get_field("relationships")?;
		let reader = index.reader()?;
		Ok(Self { index, reader, title_field, page_field, text_field, relationships_field })
	}

	pub fn index_pages(&self, pages: &[ReferencePage]) -> Result<usize> {
		let mut index_writer: tantivy::IndexWriter = self.index.writer(50_000_000)?;
		for page in pages {
			let relationships = serde_json::to_string(&page.relationships)?;
			index_writer.add_document(doc!(
				self.title_field => page.title.clone(),
				self.page_field => page.page_number,
				self.text_field => page.original_text.clone(),
				self.relationships_field => relationships,
			))?;
		}
		index_writer.commit()?;
		self.reader.reload()?;
		info!(pages = pages.len(), "tantivy index committed");
		Ok(pages.len())
	}

	fn search_pages(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		let searcher = self.reader.searcher();
		let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
		let (q, errors) = qp.parse_query_lenient(query);
		if !errors.is_empty() { debug!(?errors, "lenient query parse dropped terms"); }
		let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let source_title = doc.get_first(self.title_field).and_then(|v| v.as_str()).map(str::to_string);
			let source_page = doc.get_first(self.page_field).and_then(|v| v.as_i64());
			let text = doc.get_first(self.text_field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			let relationships = match doc.get_first(self.relationships_field).and_then(|v| v.as_str()) {
				Some(raw) => serde_json::from_str::<Vec<Relationship>>(raw).unwrap_or_else(|e| { warn!(error = %e, "unreadable stored relationships"); vec![] }),
				None => vec![],
			};
			hits.push(SearchHit { score, source_title, source_page, text, relationships });
		}
		Ok(hits)
	}
}

impl KeywordSearch for TantivyIndexer {
	fn keyword_search(&self, query: &str, limit: usize) -> peds_core::error::Result<Vec<SearchHit>> {
		if limit == 0 { return Ok(vec![]); }
		self.search_pages(query, limit).map_err(|e| Error::upstream("tantivy", e))
	}
}
