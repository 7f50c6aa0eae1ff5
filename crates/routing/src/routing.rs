// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, HashMap};

use indexmap::{IndexMap, IndexSet};
use reifydb_type::{Error, Result};
use tracing::{debug, instrument};

use crate::{FetchSource, NodeId, Projection, ReaderId, TableIdent};

/// Static routing for one query execution.
///
/// Answers three questions: which node owns a reader, which table a reader
/// scans, and what has to be fetched for a table.
#[derive(Debug, Clone)]
pub struct FetchRouting {
	node_readers: IndexMap<NodeId, IndexSet<ReaderId>>,
	reader_owners: HashMap<ReaderId, NodeId>,
	reader_bases: BTreeMap<ReaderId, String>,
	index_tables: HashMap<String, TableIdent>,
	sources: Vec<(TableIdent, FetchSource)>,
}

impl FetchRouting {
	pub fn builder() -> FetchRoutingBuilder {
		FetchRoutingBuilder::default()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
		self.node_readers.keys()
	}

	pub fn readers_for_node(&self, node: &NodeId) -> Option<&IndexSet<ReaderId>> {
		self.node_readers.get(node)
	}

	pub fn node_for_reader(&self, reader: ReaderId) -> Option<&NodeId> {
		self.reader_owners.get(&reader)
	}

	/// The index a reader scans: the one with the greatest reader base not
	/// above `reader`.
	pub fn index_for_reader(&self, reader: ReaderId) -> Option<&str> {
		self.reader_bases.range(..=reader).next_back().map(|(_, index)| index.as_str())
	}

	pub fn table_for_reader(&self, reader: ReaderId) -> Option<&TableIdent> {
		self.index_for_reader(reader).and_then(|index| self.index_tables.get(index))
	}

	pub fn fetch_source(&self, table: &TableIdent) -> Option<&FetchSource> {
		self.sources.iter().find(|(t, _)| t == table).map(|(_, source)| source)
	}

	/// Checks that the routing can serve every placeholder of `projection`.
	#[instrument(name = "routing::validate", level = "debug", skip_all, fields(nodes = self.node_readers.len(), outputs = projection.len()))]
	pub fn validate(&self, projection: &Projection) -> Result<()> {
		for index in self.reader_bases.values() {
			if !self.index_tables.contains_key(index) {
				return Err(Error::UnboundIndex {
					index: index.clone(),
				});
			}
		}

		let mut owners: HashMap<ReaderId, &NodeId> = HashMap::new();
		for (node, readers) in &self.node_readers {
			for reader in readers {
				if let Some(first) = owners.insert(*reader, node) {
					return Err(Error::DuplicateReaderOwner {
						reader: reader.0,
						first: first.to_string(),
						second: node.to_string(),
					});
				}
				if self.table_for_reader(*reader).is_none() {
					return Err(Error::UnresolvedReader {
						node: node.to_string(),
						reader: reader.0,
					});
				}
			}
		}

		for placeholder in projection.placeholders() {
			let table = &placeholder.column.table;
			let mut matching = self.sources.iter().filter(|(t, _)| t == table).map(|(_, source)| source);
			let source = match (matching.next(), matching.count()) {
				(None, _) => {
					return Err(Error::MissingFetchSource {
						table: table.to_string(),
					});
				}
				(Some(source), 0) => source,
				(Some(_), rest) => {
					return Err(Error::DuplicateFetchSource {
						table: table.to_string(),
						count: rest + 1,
					});
				}
			};

			if !source.has_fetch_id_column(placeholder.fetch_id_index) {
				return Err(Error::FetchIdColumnNotDeclared {
					table: table.to_string(),
					index: placeholder.fetch_id_index,
				});
			}

			let Some(position) = source.position_of(&placeholder.column) else {
				return Err(Error::UnknownFetchColumn {
					table: table.to_string(),
					column: placeholder.column.name.clone(),
				});
			};

			let provided = source.references[position].ty;
			if provided != placeholder.column.ty {
				return Err(Error::ColumnTypeMismatch {
					table: table.to_string(),
					column: placeholder.column.name.clone(),
					declared: placeholder.column.ty,
					provided,
				});
			}
		}

		debug!("routing validated");
		Ok(())
	}
}

#[derive(Debug, Default)]
pub struct FetchRoutingBuilder {
	node_readers: IndexMap<NodeId, IndexSet<ReaderId>>,
	reader_bases: BTreeMap<ReaderId, String>,
	index_tables: HashMap<String, TableIdent>,
	sources: Vec<(TableIdent, FetchSource)>,
}

impl FetchRoutingBuilder {
	/// Adds readers owned by `node`. Repeated calls for one node accumulate.
	pub fn node<R: Into<ReaderId>>(mut self, node: impl Into<NodeId>, readers: impl IntoIterator<Item = R>) -> Self {
		self.node_readers.entry(node.into()).or_default().extend(readers.into_iter().map(Into::into));
		self
	}

	pub fn reader_base(mut self, base: impl Into<ReaderId>, index: impl Into<String>) -> Self {
		self.reader_bases.insert(base.into(), index.into());
		self
	}

	pub fn index(mut self, index: impl Into<String>, table: TableIdent) -> Self {
		self.index_tables.insert(index.into(), table);
		self
	}

	/// Binds `base` to an index named after `table`.
	pub fn reader_table(self, base: impl Into<ReaderId>, table: TableIdent) -> Self {
		let index = table.to_string();
		self.reader_base(base, index.clone()).index(index, table)
	}

	pub fn source(mut self, table: TableIdent, source: FetchSource) -> Self {
		self.sources.push((table, source));
		self
	}

	pub fn build(self) -> FetchRouting {
		let mut reader_owners = HashMap::new();
		for (node, readers) in &self.node_readers {
			for reader in readers {
				reader_owners.entry(*reader).or_insert_with(|| node.clone());
			}
		}

		FetchRouting {
			node_readers: self.node_readers,
			reader_owners,
			reader_bases: self.reader_bases,
			index_tables: self.index_tables,
			sources: self.sources,
		}
	}
}
