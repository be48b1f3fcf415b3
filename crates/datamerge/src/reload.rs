//! Two-phase reload: aggregate (prepare), then hand the result over (apply).

use tracing::info;

use crate::multi_json::{JsonParser, MultiJsonData, MultiJsonLoader};
use crate::resource::ResourceManager;

/// Receives the fresh result of every reload.
pub trait ReloadListener {
    fn apply(&mut self, data: MultiJsonData);
}

impl<F: FnMut(MultiJsonData)> ReloadListener for F {
    fn apply(&mut self, data: MultiJsonData) {
        self(data)
    }
}

/// Keeps only the most recent reload result.
#[derive(Debug, Default)]
pub struct LatestData {
    data: MultiJsonData,
    reloads: u64,
}

impl LatestData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &MultiJsonData {
        &self.data
    }

    /// Number of reloads applied so far.
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    pub fn into_data(self) -> MultiJsonData {
        self.data
    }
}

impl ReloadListener for LatestData {
    fn apply(&mut self, data: MultiJsonData) {
        self.data = data;
        self.reloads += 1;
    }
}

impl<P: JsonParser> MultiJsonLoader<P> {
    /// Aggregate from `manager` and apply the result to `listener`.
    ///
    /// The listener's previous data is not consulted; each reload is a full
    /// replacement.
    pub fn reload<M, L>(&self, manager: &M, listener: &mut L)
    where
        M: ResourceManager,
        L: ReloadListener + ?Sized,
    {
        let report = self.aggregate_with_report(manager);
        info!(
            resource_type = self.resource_type(),
            identifiers = report.data.len(),
            skipped = report.skipped.len(),
            "Reloaded data"
        );
        listener.apply(report.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;
    use crate::test_utils::MemoryResources;

    #[test]
    fn latest_data_replaces_previous() {
        let loader = MultiJsonLoader::new("powers");
        let mut latest = LatestData::new();

        let mut first = MemoryResources::new();
        first
            .add("a", "ns:powers/old.json", "{}")
            .add("a", "ns:powers/kept.json", "1");
        loader.reload(&first, &mut latest);
        assert_eq!(latest.reloads(), 1);
        assert!(latest.data().contains(&Identifier::new("ns", "old")));

        let mut second = MemoryResources::new();
        second.add("a", "ns:powers/kept.json", "2");
        loader.reload(&second, &mut latest);

        assert_eq!(latest.reloads(), 2);
        assert!(!latest.data().contains(&Identifier::new("ns", "old")));
        assert_eq!(
            latest.data().get(&Identifier::new("ns", "kept")).unwrap(),
            &[serde_json::json!(2)]
        );
    }

    #[test]
    fn closure_listener() {
        let mut res = MemoryResources::new();
        res.add("a", "ns:powers/foo.json", "{}");

        let mut seen = Vec::new();
        MultiJsonLoader::new("powers").reload(&res, &mut |data: MultiJsonData| {
            seen.push(data.len());
        });
        assert_eq!(seen, vec![1]);
    }
}
