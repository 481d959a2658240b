//! Directed sync links and the default page topology

use crate::config::ParallaxConfig;
use crate::surface::SurfaceRole;

use super::guard::Direction;
use super::transfer::TransferFn;

/// How a link's computed offset reaches the dependent surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written immediately, so the dependent feels rigidly attached
    Direct,
    /// Computed once per frame for all eased dependents of the source and
    /// handed to each dependent's animator
    Eased,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncLink {
    pub from: SurfaceRole,
    pub to: SurfaceRole,
    pub transfer: TransferFn,
    pub delivery: Delivery,
}

impl SyncLink {
    pub fn new(from: SurfaceRole, to: SurfaceRole, transfer: TransferFn, delivery: Delivery) -> Self {
        Self {
            from,
            to,
            transfer,
            delivery,
        }
    }

    /// 1:1 positional mirror
    pub fn mirror(from: SurfaceRole, to: SurfaceRole) -> Self {
        Self::new(from, to, TransferFn::Identity, Delivery::Direct)
    }

    /// End-to-end lockstep between two content rows, eased so the follower
    /// glides after its source
    pub fn ratio(from: SurfaceRole, to: SurfaceRole) -> Self {
        Self::new(from, to, TransferFn::RatioRescale, Delivery::Eased)
    }

    /// End-to-end lockstep with a scrollbar, written rigidly
    pub fn scrollbar(from: SurfaceRole, to: SurfaceRole) -> Self {
        Self::new(from, to, TransferFn::RatioRescale, Delivery::Direct)
    }

    /// Parallax layer following `from` at `speed`
    pub fn parallax(from: SurfaceRole, to: SurfaceRole, speed: f64) -> Self {
        Self::new(from, to, TransferFn::Parallax { speed }, Delivery::Eased)
    }

    pub fn direction(&self) -> Direction {
        Direction::new(self.from, self.to)
    }
}

/// The full set of links wired on a page
#[derive(Debug, Clone, Default)]
pub struct Topology {
    links: Vec<SyncLink>,
}

impl Topology {
    pub fn new(links: Vec<SyncLink>) -> Self {
        Self { links }
    }

    /// Links between every role a page can have
    pub fn standard(parallax: &ParallaxConfig) -> Self {
        use SurfaceRole::*;

        Self::new(vec![
            // Fixed scrollbar mirrors the primary row both ways
            SyncLink::mirror(Primary, Proxy),
            SyncLink::mirror(Proxy, Primary),
            // Top row in lockstep both ways
            SyncLink::ratio(Primary, Top),
            SyncLink::ratio(Top, Primary),
            // Secondary row and its shared scrollbar form a loop through the primary
            SyncLink::ratio(Primary, Secondary),
            SyncLink::scrollbar(Secondary, SecondaryProxy),
            SyncLink::scrollbar(SecondaryProxy, Primary),
            // Depth layers
            SyncLink::parallax(Primary, ParallaxBack, parallax.back_speed),
            SyncLink::parallax(Primary, ParallaxFront, parallax.front_speed),
        ])
    }

    /// Keep only links whose endpoints both exist
    pub fn retain_present(mut self, present: impl Fn(SurfaceRole) -> bool) -> Self {
        self.links.retain(|link| {
            let keep = present(link.from) && present(link.to);
            if !keep {
                tracing::debug!("Skipping sync link {} -> {}: surface missing", link.from, link.to);
            }
            keep
        });
        self
    }

    pub fn links(&self) -> &[SyncLink] {
        &self.links
    }

    pub fn from_source(&self, source: SurfaceRole) -> impl Iterator<Item = &SyncLink> + '_ {
        self.links.iter().filter(move |link| link.from == source)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SurfaceRole::*;

    #[test]
    fn test_standard_fan_out() {
        let topology = Topology::standard(&ParallaxConfig::default());
        let from_primary: Vec<_> = topology.from_source(Primary).map(|l| l.to).collect();
        assert_eq!(from_primary, vec![Proxy, Top, Secondary, ParallaxBack, ParallaxFront]);

        // Only the scrollbars are attached rigidly
        let direct: Vec<_> = topology
            .links()
            .iter()
            .filter(|l| l.delivery == Delivery::Direct)
            .map(|l| (l.from, l.to))
            .collect();
        assert_eq!(
            direct,
            vec![
                (Primary, Proxy),
                (Proxy, Primary),
                (Secondary, SecondaryProxy),
                (SecondaryProxy, Primary)
            ]
        );
        assert_eq!(topology.len() - direct.len(), 5);
    }

    #[test]
    fn test_missing_surfaces_drop_links() {
        let topology = Topology::standard(&ParallaxConfig::default())
            .retain_present(|role| matches!(role, Primary | Proxy));
        assert_eq!(topology.len(), 2);
        assert!(topology.links().iter().all(|l| l.transfer == TransferFn::Identity));
    }

    #[test]
    fn test_parallax_speeds_from_config() {
        let config = ParallaxConfig {
            back_speed: 0.5,
            front_speed: 2.0,
        };
        let topology = Topology::standard(&config);
        let front = topology.links().iter().find(|l| l.to == ParallaxFront).unwrap();
        assert_eq!(front.transfer, TransferFn::Parallax { speed: 2.0 });
    }
}
