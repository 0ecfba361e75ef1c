//! In-memory repository.
//!
//! [`MemoryRepository`] implements the full [`Repository`] contract against a
//! process-local object tree. It backs the `memory:` session URL and the
//! adapter's test suites, and supports fault injection so callers
//! can exercise remote-failure paths deterministically.

use crate::error::{RepoError, RepoOpContext, RepoResult};
use crate::object::{ObjectId, ObjectKind, RepoObject, RepositoryInfo};
use crate::path::RepoPath;
use crate::repository::{ContentStream, Repository};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::time::SystemTime;
use tracing::trace;

/// Repository operations, for fault injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    ObjectByPath,
    Children,
    ContentStream,
    CreateFolder,
    CreateDocument,
    SetContentStream,
    Delete,
    Rename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Once,
    Always,
}

#[derive(Debug)]
enum NodeKind {
    Folder { children: BTreeMap<String, ObjectId> },
    Document { content: Vec<u8> },
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<ObjectId>,
    kind: NodeKind,
    created: SystemTime,
    modified: SystemTime,
}

impl Node {
    fn snapshot(&self, id: &ObjectId) -> RepoObject {
        let kind = match &self.kind {
            NodeKind::Folder { .. } => ObjectKind::Folder,
            NodeKind::Document { content } => ObjectKind::Document {
                content_length: Some(content.len() as u64),
            },
        };
        RepoObject {
            id: id.clone(),
            name: self.name.clone(),
            kind,
            created: Some(self.created),
            modified: Some(self.modified),
            parent_id: self.parent.clone(),
        }
    }
}

#[derive(Debug)]
struct Tree {
    nodes: HashMap<ObjectId, Node>,
    root: ObjectId,
}

impl Tree {
    fn node(&self, id: &ObjectId) -> RepoResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| RepoError::not_found(format!("object {id}")))
    }

    fn lookup(&self, path: &RepoPath) -> Option<&ObjectId> {
        let mut current = &self.root;
        for segment in path.segments() {
            match &self.nodes.get(current)?.kind {
                NodeKind::Folder { children } => current = children.get(segment)?,
                NodeKind::Document { .. } => return None,
            }
        }
        Some(current)
    }

    fn folder_children_mut(&mut self, id: &ObjectId) -> RepoResult<&mut BTreeMap<String, ObjectId>> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found(format!("object {id}")))?;
        match &mut node.kind {
            NodeKind::Folder { children } => Ok(children),
            NodeKind::Document { .. } => Err(RepoError::NotAFolder {
                context: RepoOpContext::new().with_object_id(id.as_str()),
            }),
        }
    }

    fn is_descendant(&self, candidate: &ObjectId, ancestor: &ObjectId) -> bool {
        let mut current = Some(candidate.clone());
        while let Some(id) = current {
            if &id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent.clone());
        }
        false
    }

    fn collect_subtree(&self, id: &ObjectId, out: &mut Vec<ObjectId>) {
        out.push(id.clone());
        if let Some(Node { kind: NodeKind::Folder { children }, .. }) = self.nodes.get(id) {
            for child in children.values() {
                self.collect_subtree(child, out);
            }
        }
    }
}

/// Process-local repository with CMIS-like semantics.
#[derive(Debug)]
pub struct MemoryRepository {
    info: RepositoryInfo,
    tree: RwLock<Tree>,
    faults: Mutex<HashMap<MemoryOp, Fault>>,
    calls: Mutex<HashMap<MemoryOp, u64>>,
}

impl MemoryRepository {
    /// Product name reported for in-memory repositories.
    pub const PRODUCT_NAME: &'static str = "CmisDrive Memory";

    /// Create an empty repository holding only a root folder.
    pub fn new() -> Self {
        Self::with_product_name(Self::PRODUCT_NAME)
    }

    /// Create an empty repository reporting a custom product name.
    pub fn with_product_name(product_name: impl Into<String>) -> Self {
        let root = ObjectId::new(uuid::Uuid::new_v4().to_string());
        let now = SystemTime::now();
        let mut nodes = HashMap::new();
        nodes.insert(
            root.clone(),
            Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Folder { children: BTreeMap::new() },
                created: now,
                modified: now,
            },
        );
        Self {
            info: RepositoryInfo {
                id: "memory".to_string(),
                name: "memory".to_string(),
                product_name: product_name.into(),
                vendor_name: "CmisDrive".to_string(),
                root_folder_id: root.clone(),
            },
            tree: RwLock::new(Tree { nodes, root }),
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next call of `op` fail with an opaque repository fault.
    pub fn fail_next(&self, op: MemoryOp) {
        self.faults.lock().insert(op, Fault::Once);
    }

    /// Make every call of `op` fail until [`clear_faults`](Self::clear_faults).
    pub fn fail_always(&self, op: MemoryOp) {
        self.faults.lock().insert(op, Fault::Always);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Number of times `op` has been invoked.
    pub fn call_count(&self, op: MemoryOp) -> u64 {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Create a folder and all missing ancestors.
    pub fn ensure_folder(&self, path: &RepoPath) -> RepoResult<RepoObject> {
        let mut current = self.object_by_path(&RepoPath::root())?;
        let mut current_path = RepoPath::root();
        for segment in path.segments() {
            current_path = current_path.join(segment);
            current = match self.object_by_path(&current_path) {
                Ok(existing) => existing,
                Err(e) if e.is_not_found() => self.create_folder(&current, segment)?,
                Err(e) => return Err(e),
            };
        }
        Ok(current)
    }

    /// Create (or overwrite) a document, creating missing parent folders.
    pub fn put_document(&self, path: &RepoPath, content: &[u8]) -> RepoResult<RepoObject> {
        let (parent_path, name) = path.split_leaf().ok_or_else(|| RepoError::InvalidArgument {
            reason: "cannot write content to the root folder".to_string(),
        })?;
        match self.object_by_path(path) {
            Ok(existing) => self.set_content_stream(&existing, content),
            Err(e) if e.is_not_found() => {
                let parent = self.ensure_folder(&parent_path)?;
                self.create_document(&parent, name, content)
            }
            Err(e) => Err(e),
        }
    }

    fn enter(&self, op: MemoryOp, context: impl FnOnce() -> RepoOpContext) -> RepoResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        let fault = {
            let mut faults = self.faults.lock();
            match faults.get(&op).copied() {
                Some(Fault::Once) => faults.remove(&op),
                fault => fault,
            }
        };
        if fault.is_some() {
            return Err(RepoError::Runtime {
                reason: "injected fault".to_string(),
                context: context(),
            });
        }
        Ok(())
    }

    fn insert_child(
        &self,
        parent: &RepoObject,
        name: &str,
        kind: NodeKind,
        operation: &'static str,
    ) -> RepoResult<RepoObject> {
        validate_name(name, operation)?;
        let mut tree = self.tree.write();
        let id = ObjectId::new(uuid::Uuid::new_v4().to_string());
        let children = tree.folder_children_mut(&parent.id)?;
        if children.contains_key(name) {
            return Err(RepoError::NameConflict {
                name: name.to_string(),
                context: RepoOpContext::new()
                    .with_operation(operation)
                    .with_object_id(parent.id.as_str()),
            });
        }
        children.insert(name.to_string(), id.clone());
        let now = SystemTime::now();
        let node = Node {
            name: name.to_string(),
            parent: Some(parent.id.clone()),
            kind,
            created: now,
            modified: now,
        };
        let snapshot = node.snapshot(&id);
        tree.nodes.insert(id, node);
        Ok(snapshot)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str, operation: &'static str) -> RepoResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(RepoError::InvalidArgument {
            reason: format!("invalid name '{name}' for {operation}"),
        });
    }
    Ok(())
}

impl Repository for MemoryRepository {
    fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    fn object_by_path(&self, path: &RepoPath) -> RepoResult<RepoObject> {
        self.enter(MemoryOp::ObjectByPath, || {
            RepoOpContext::new().with_operation("getObjectByPath").with_path(path.as_str())
        })?;
        let tree = self.tree.read();
        let id = tree.lookup(path).ok_or_else(|| RepoError::not_found(path.as_str()))?;
        trace!(path = %path, id = %id, "memory resolve");
        Ok(tree.node(id)?.snapshot(id))
    }

    fn children(&self, folder: &RepoObject) -> RepoResult<Vec<RepoObject>> {
        self.enter(MemoryOp::Children, || {
            RepoOpContext::new().with_operation("getChildren").with_object_id(folder.id.as_str())
        })?;
        let tree = self.tree.read();
        match &tree.node(&folder.id)?.kind {
            NodeKind::Folder { children } => children
                .values()
                .map(|id| tree.node(id).map(|n| n.snapshot(id)))
                .collect(),
            NodeKind::Document { .. } => Err(RepoError::NotAFolder {
                context: RepoOpContext::new()
                    .with_operation("getChildren")
                    .with_object_id(folder.id.as_str()),
            }),
        }
    }

    fn content_stream(&self, document: &RepoObject) -> RepoResult<ContentStream> {
        self.enter(MemoryOp::ContentStream, || {
            RepoOpContext::new()
                .with_operation("getContentStream")
                .with_object_id(document.id.as_str())
        })?;
        let tree = self.tree.read();
        match &tree.node(&document.id)?.kind {
            NodeKind::Document { content } => Ok(Box::new(Cursor::new(content.clone()))),
            NodeKind::Folder { .. } => Err(RepoError::NotADocument {
                context: RepoOpContext::new()
                    .with_operation("getContentStream")
                    .with_object_id(document.id.as_str()),
            }),
        }
    }

    fn create_folder(&self, parent: &RepoObject, name: &str) -> RepoResult<RepoObject> {
        self.enter(MemoryOp::CreateFolder, || {
            RepoOpContext::new().with_operation("createFolder").with_object_id(parent.id.as_str())
        })?;
        self.insert_child(
            parent,
            name,
            NodeKind::Folder { children: BTreeMap::new() },
            "createFolder",
        )
    }

    fn create_document(
        &self,
        parent: &RepoObject,
        name: &str,
        content: &[u8],
    ) -> RepoResult<RepoObject> {
        self.enter(MemoryOp::CreateDocument, || {
            RepoOpContext::new()
                .with_operation("createDocument")
                .with_object_id(parent.id.as_str())
        })?;
        self.insert_child(
            parent,
            name,
            NodeKind::Document { content: content.to_vec() },
            "createDocument",
        )
    }

    fn set_content_stream(&self, document: &RepoObject, content: &[u8]) -> RepoResult<RepoObject> {
        self.enter(MemoryOp::SetContentStream, || {
            RepoOpContext::new()
                .with_operation("setContentStream")
                .with_object_id(document.id.as_str())
        })?;
        let mut tree = self.tree.write();
        let node = tree
            .nodes
            .get_mut(&document.id)
            .ok_or_else(|| RepoError::not_found(format!("object {}", document.id)))?;
        match &mut node.kind {
            NodeKind::Document { content: existing } => {
                *existing = content.to_vec();
                node.modified = SystemTime::now();
                Ok(node.snapshot(&document.id))
            }
            NodeKind::Folder { .. } => Err(RepoError::NotADocument {
                context: RepoOpContext::new()
                    .with_operation("setContentStream")
                    .with_object_id(document.id.as_str()),
            }),
        }
    }

    fn delete(&self, object: &RepoObject, recursive: bool) -> RepoResult<()> {
        self.enter(MemoryOp::Delete, || {
            RepoOpContext::new().with_operation("delete").with_object_id(object.id.as_str())
        })?;
        let mut tree = self.tree.write();
        if object.id == tree.root {
            return Err(RepoError::PermissionDenied {
                context: RepoOpContext::new().with_operation("delete").with_path("/"),
            });
        }
        let node = tree.node(&object.id)?;
        if let NodeKind::Folder { children } = &node.kind
            && !children.is_empty()
            && !recursive
        {
            return Err(RepoError::FolderNotEmpty {
                context: RepoOpContext::new()
                    .with_operation("delete")
                    .with_object_id(object.id.as_str()),
            });
        }
        let name = node.name.clone();
        let parent = node.parent.clone();

        let mut doomed = Vec::new();
        tree.collect_subtree(&object.id, &mut doomed);
        for id in &doomed {
            tree.nodes.remove(id);
        }
        if let Some(parent) = parent {
            tree.folder_children_mut(&parent)?.remove(&name);
        }
        Ok(())
    }

    fn rename(&self, object: &RepoObject, new_path: &RepoPath) -> RepoResult<RepoObject> {
        self.enter(MemoryOp::Rename, || {
            RepoOpContext::new().with_operation("rename").with_path(new_path.as_str())
        })?;
        let (parent_path, new_name) = new_path.split_leaf().ok_or_else(|| {
            RepoError::InvalidArgument { reason: "cannot rename onto the root folder".to_string() }
        })?;
        validate_name(new_name, "rename")?;

        let mut tree = self.tree.write();
        if object.id == tree.root {
            return Err(RepoError::PermissionDenied {
                context: RepoOpContext::new().with_operation("rename").with_path("/"),
            });
        }
        let new_parent = tree
            .lookup(&parent_path)
            .cloned()
            .ok_or_else(|| RepoError::not_found(parent_path.as_str()))?;
        if tree.is_descendant(&new_parent, &object.id) {
            return Err(RepoError::InvalidArgument {
                reason: format!("cannot move '{}' into itself", object.name),
            });
        }

        let node = tree.node(&object.id)?;
        let old_name = node.name.clone();
        let old_parent = node.parent.clone();

        let target_children = tree.folder_children_mut(&new_parent)?;
        if let Some(existing) = target_children.get(new_name)
            && existing != &object.id
        {
            return Err(RepoError::NameConflict {
                name: new_name.to_string(),
                context: RepoOpContext::new()
                    .with_operation("rename")
                    .with_path(new_path.as_str()),
            });
        }

        if let Some(old_parent) = &old_parent {
            tree.folder_children_mut(old_parent)?.remove(&old_name);
        }
        tree.folder_children_mut(&new_parent)?
            .insert(new_name.to_string(), object.id.clone());

        let node = tree
            .nodes
            .get_mut(&object.id)
            .ok_or_else(|| RepoError::not_found(format!("object {}", object.id)))?;
        node.name = new_name.to_string();
        node.parent = Some(new_parent);
        node.modified = SystemTime::now();
        Ok(node.snapshot(&object.id))
    }
}
