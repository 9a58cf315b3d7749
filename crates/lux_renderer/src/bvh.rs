//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to each other (and to the owned
//! primitives) by index, so the whole tree is freed at once.

use crate::{HitRecord, Hittable, RenderError, RenderResult};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::{Rng, RngCore};
use std::cmp::Ordering;

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone, Copy)]
pub enum BvhNode {
    /// Internal node; `left` and `right` index into the node arena and may
    /// be equal for a single-element range.
    Branch { bbox: Aabb, left: usize, right: usize },
    /// Leaf node; `primitive` indexes into the primitive list.
    Leaf { bbox: Aabb, primitive: usize },
}

impl BvhNode {
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitives: Vec<Hittable>,
    root: usize,
}

impl Bvh {
    /// Build a BVH over `objects`.
    ///
    /// Each level splits along a randomly chosen axis after sorting by the
    /// bounding-box minimum on that axis.
    pub fn build(objects: Vec<Hittable>, rng: &mut dyn RngCore) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let boxes: Vec<Aabb> = objects.iter().map(Hittable::bounding_box).collect();
        if let Some(index) = boxes.iter().position(|bbox| !bbox.is_finite()) {
            return Err(RenderError::UnboundedPrimitive { index });
        }

        let mut order: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(2 * objects.len());
        let root = Self::build_range(&mut nodes, &boxes, &mut order, rng);

        log::debug!(
            "Built BVH: {} nodes over {} primitives",
            nodes.len(),
            objects.len()
        );

        Ok(Self {
            nodes,
            primitives: objects,
            root,
        })
    }

    /// Recursive construction over `order` (a slice of primitive indices).
    /// Returns the arena index of the subtree root.
    fn build_range(
        nodes: &mut Vec<BvhNode>,
        boxes: &[Aabb],
        order: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> usize {
        let axis = rng.gen_range(0..3);

        let (left, right) = match order.len() {
            1 => {
                let leaf = Self::push_leaf(nodes, boxes, order[0]);
                (leaf, leaf)
            }
            2 => (
                Self::push_leaf(nodes, boxes, order[0]),
                Self::push_leaf(nodes, boxes, order[1]),
            ),
            n => {
                order.sort_by(|&a, &b| {
                    let a_min = boxes[a].axis_interval(axis).min;
                    let b_min = boxes[b].axis_interval(axis).min;
                    a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
                });

                let (left_half, right_half) = order.split_at_mut(n / 2);
                let left = Self::build_range(nodes, boxes, left_half, rng);
                let right = Self::build_range(nodes, boxes, right_half, rng);
                (left, right)
            }
        };

        let bbox = Aabb::surrounding(&nodes[left].bbox(), &nodes[right].bbox());
        nodes.push(BvhNode::Branch { bbox, left, right });
        nodes.len() - 1
    }

    fn push_leaf(nodes: &mut Vec<BvhNode>, boxes: &[Aabb], primitive: usize) -> usize {
        nodes.push(BvhNode::Leaf {
            bbox: boxes[primitive],
            primitive,
        });
        nodes.len() - 1
    }

    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.hit_node(self.root, ray, ray_t, rng)
    }

    fn hit_node<'a>(
        &'a self,
        index: usize,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self.nodes[index] {
            BvhNode::Leaf { bbox, primitive } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                self.primitives[primitive].hit(ray, ray_t, rng)
            }
            BvhNode::Branch { bbox, left, right } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = self.hit_node(left, ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = self.hit_node(right, ray, ray_t.with_max(right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.nodes[self.root].bbox()
    }

    /// Average of the primitives' densities, matching [`Bvh::random`].
    pub fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let weight = 1.0 / self.primitives.len() as f32;
        self.primitives
            .iter()
            .map(|primitive| weight * primitive.pdf_value(origin, direction))
            .sum()
    }

    /// Direction toward a uniformly chosen primitive.
    pub fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let index = rng.gen_range(0..self.primitives.len());
        self.primitives[index].random(origin, rng)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Verify that every node's box encloses its children (or primitive).
    pub fn check_bounds(&self) -> bool {
        self.nodes.iter().all(|node| match *node {
            BvhNode::Branch { bbox, left, right } => {
                bbox.encloses(&self.nodes[left].bbox()) && bbox.encloses(&self.nodes[right].bbox())
            }
            BvhNode::Leaf { bbox, primitive } => {
                bbox.encloses(&self.primitives[primitive].bounding_box())
            }
        })
    }
}
