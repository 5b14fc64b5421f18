use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tracing::trace;

use crate::{
    PipeforgeError, Result,
    backend::{
        Collection,
        mem::{MemData, MemDocument, change, read, write},
    },
    utils::name::same_name,
};

/// One in-memory collection, kept in insertion order.
#[derive(Debug)]
pub(crate) struct Collect<T> {
    data: Arc<MemData>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Collect<T> {
    pub(super) fn new(data: Arc<MemData>) -> Self {
        Self {
            data,
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T: MemDocument> Collection for Collect<T> {
    type Item = T;

    async fn list(&self) -> Result<Vec<T>> {
        Ok(read(T::rows(&self.data)).clone())
    }

    async fn find(
        &self,
        name: &str,
    ) -> Result<T> {
        read(T::rows(&self.data))
            .iter()
            .find(|item| same_name(item.name(), name))
            .cloned()
            .ok_or(PipeforgeError::NotFound(format!("{} not found: {}.", T::iden().kind(), name)))
    }

    async fn create(
        &self,
        item: &T,
    ) -> Result<()> {
        let kind = T::iden().kind();
        trace!("mem::create({}, {})", kind, item.name());

        let mut item = item.clone();
        item.normalize();
        if item.name().is_empty() {
            return Err(PipeforgeError::Validation(format!("{} name may not be blank.", kind)));
        }

        let _change = change(&self.data);
        item.check(&self.data)?;

        let mut rows = write(T::rows(&self.data));
        match rows.iter().find(|existing| existing.name() == item.name()) {
            // saving the same element twice is a no-op
            Some(existing) if *existing == item => Ok(()),
            Some(_) => Err(PipeforgeError::Validation(format!(
                "Failed to add {} with name \"{}\" because another {} with the same name already exists.",
                kind,
                item.name(),
                kind
            ))),
            None => {
                rows.push(item);
                Ok(())
            }
        }
    }

    async fn delete(
        &self,
        name: &str,
    ) -> Result<()> {
        let kind = T::iden().kind();
        trace!("mem::delete({}, {})", kind, name);

        let _change = change(&self.data);
        if let Some(user) = T::referenced_by(name, &self.data) {
            return Err(PipeforgeError::Conflict(format!("Cannot delete {} \"{}\" because it is used by \"{}\".", kind.to_lowercase(), name, user)));
        }

        let mut rows = write(T::rows(&self.data));
        let before = rows.len();
        rows.retain(|item| !same_name(item.name(), name));
        if rows.len() == before {
            return Err(PipeforgeError::NotFound(format!("{} not found: {}.", kind, name)));
        }
        Ok(())
    }
}
