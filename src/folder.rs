// folder.rs
// Folder resolution by localized display name

use log::{debug, info};

use crate::error::{Error, Result};
use crate::ews::types::{
    BaseShape, DistinguishedFolder, EwsRequest, FindFolder, Folder, FolderReference,
    FolderTraversal, PageSpec,
};
use crate::filter::{FieldUri, FilterBuilder};
use crate::impersonation::ImpersonationContext;
use crate::response::ResponseUnwrapper;
use crate::transport::{CallOptions, Transport};

/// Finds a folder whose display name is any one of a list of candidates.
///
/// Well-known folders carry a locale-dependent display name ("Inbox",
/// "Inkorg", ...). All candidates go into one `Or` restriction so a single
/// round trip resolves whichever exists.
pub struct FolderLocator<'a, T> {
    transport: &'a T,
    options: CallOptions,
}

impl<'a, T: Transport> FolderLocator<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        FolderLocator {
            transport,
            options: CallOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the first folder below `root` matching any of `candidates`.
    pub async fn find_folder<S: AsRef<str>>(
        &self,
        impersonation: &ImpersonationContext,
        root: DistinguishedFolder,
        candidates: &[S],
        max_results: u32,
    ) -> Result<Folder> {
        let restriction = FilterBuilder::any_of(FieldUri::FolderDisplayName, candidates)?;
        let request = EwsRequest::FindFolder(FindFolder {
            traversal: FolderTraversal::Deep,
            shape: BaseShape::AllProperties,
            page: PageSpec::first(max_results)?,
            restriction: Some(restriction),
            parent_folder_ids: vec![root.into()],
        });
        debug!(
            "Locating folder below {} named any of {:?}",
            root.as_str(),
            candidates.iter().map(AsRef::as_ref).collect::<Vec<_>>()
        );

        let envelope = self
            .transport
            .execute(&request, impersonation, &self.options)
            .await?;
        let folders: Vec<Folder> = ResponseUnwrapper::unwrap_single(envelope, "FindFolder")?;

        let folder = folders
            .into_iter()
            .next()
            .ok_or_else(|| Error::FolderNotFound {
                candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            })?;
        info!(
            "Located folder '{}' for {}",
            folder.display_name().unwrap_or_default(),
            impersonation.sid()
        );
        Ok(folder)
    }

    /// Like [`FolderLocator::find_folder`], returning only the folder's id.
    pub async fn locate<S: AsRef<str>>(
        &self,
        impersonation: &ImpersonationContext,
        root: DistinguishedFolder,
        candidates: &[S],
        max_results: u32,
    ) -> Result<FolderReference> {
        self.find_folder(impersonation, root, candidates, max_results)
            .await?
            .reference()
    }
}
