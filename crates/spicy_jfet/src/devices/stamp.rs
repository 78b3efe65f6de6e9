/// MNA nodes of a JFET, as MNA indices (`None` is ground).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfetNodes {
    pub drain: Option<usize>,
    pub gate: Option<usize>,
    pub source: Option<usize>,
    pub drain_prime: Option<usize>,
    pub source_prime: Option<usize>,
}

/// Cached MNA stamp slots for a JFET with its internal drain/source nodes.
///
/// Field names use row-first notation: `g_dp` means row=gate,
/// col=drain-prime. A slot is an accumulator position in the shared matrix,
/// valid until the next resetup; `None` slots touch ground and are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JfetStamp {
    pub d_d: Option<usize>,
    pub g_g: Option<usize>,
    pub s_s: Option<usize>,
    pub dp_dp: Option<usize>,
    pub sp_sp: Option<usize>,
    pub d_dp: Option<usize>,
    pub g_dp: Option<usize>,
    pub g_sp: Option<usize>,
    pub s_sp: Option<usize>,
    pub dp_d: Option<usize>,
    pub dp_g: Option<usize>,
    pub dp_sp: Option<usize>,
    pub sp_g: Option<usize>,
    pub sp_s: Option<usize>,
    pub sp_dp: Option<usize>,
}

impl JfetStamp {
    /// Create a stamp with no indices assigned yet.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Compute and set temporary indices from node locations.
    ///
    /// The `entry` callback receives (column, row) to match `MatrixBuilder::push`.
    pub fn set_temp_indices_from_nodes<F, E>(
        &mut self,
        nodes: JfetNodes,
        mut entry: F,
    ) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<usize, E>,
    {
        let JfetNodes {
            drain: d,
            gate: g,
            source: s,
            drain_prime: dp,
            source_prime: sp,
        } = nodes;
        let mut at = |row: Option<usize>, col: Option<usize>| match (row, col) {
            (Some(row), Some(col)) => entry(col, row).map(Some),
            _ => Ok(None),
        };

        *self = Self {
            d_d: at(d, d)?,
            g_g: at(g, g)?,
            s_s: at(s, s)?,
            dp_dp: at(dp, dp)?,
            sp_sp: at(sp, sp)?,
            d_dp: at(d, dp)?,
            g_dp: at(g, dp)?,
            g_sp: at(g, sp)?,
            s_sp: at(s, sp)?,
            dp_d: at(dp, d)?,
            dp_g: at(dp, g)?,
            dp_sp: at(dp, sp)?,
            sp_g: at(sp, g)?,
            sp_s: at(sp, s)?,
            sp_dp: at(sp, dp)?,
        };
        Ok(())
    }

    /// Map temporary indices to their final locations using the provided mapping.
    pub fn set_final_indices<F>(&mut self, mut f: F)
    where
        F: FnMut(usize) -> usize,
    {
        for slot in self.slots_mut() {
            *slot = slot.map(&mut f);
        }
    }

    fn slots_mut(&mut self) -> [&mut Option<usize>; 15] {
        [
            &mut self.d_d,
            &mut self.g_g,
            &mut self.s_s,
            &mut self.dp_dp,
            &mut self.sp_sp,
            &mut self.d_dp,
            &mut self.g_dp,
            &mut self.g_sp,
            &mut self.s_sp,
            &mut self.dp_d,
            &mut self.dp_g,
            &mut self.dp_sp,
            &mut self.sp_g,
            &mut self.sp_s,
            &mut self.sp_dp,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::builder::MatrixBuilder;

    #[test]
    fn grounded_source_skips_source_entries() {
        let mut builder = MatrixBuilder::new(3);
        let mut stamp = JfetStamp::uninitialized();
        assert_eq!(stamp, JfetStamp::default());

        let nodes = JfetNodes {
            drain: Some(0),
            gate: Some(1),
            source: None,
            drain_prime: Some(2),
            source_prime: None,
        };
        stamp
            .set_temp_indices_from_nodes(nodes, |c, r| builder.push(c, r))
            .unwrap();

        assert_ne!(stamp, JfetStamp::default());
        assert_eq!(stamp.s_s, None);
        assert_eq!(stamp.sp_sp, None);
        assert_eq!(stamp.g_sp, None);
        assert!(stamp.g_dp.is_some());

        let (pattern, mapping) = builder.build_csc_pattern().unwrap();
        stamp.set_final_indices(|i| mapping.get(i));
        assert_eq!(stamp.g_dp, pattern.find(1, 2));
        assert_eq!(stamp.dp_g, pattern.find(2, 1));
        assert_eq!(stamp.d_dp, pattern.find(0, 2));
    }

    #[test]
    fn aliased_internal_nodes_share_slots() {
        let mut builder = MatrixBuilder::new(3);
        let mut stamp = JfetStamp::uninitialized();
        let nodes = JfetNodes {
            drain: Some(0),
            gate: Some(1),
            source: Some(2),
            drain_prime: Some(0),
            source_prime: Some(2),
        };
        stamp
            .set_temp_indices_from_nodes(nodes, |c, r| builder.push(c, r))
            .unwrap();
        let (pattern, mapping) = builder.build_csc_pattern().unwrap();
        stamp.set_final_indices(|i| mapping.get(i));

        assert_eq!(stamp.d_d, stamp.dp_dp);
        assert_eq!(stamp.d_dp, stamp.d_d);
        assert_eq!(stamp.sp_s, stamp.s_s);
        // 3x3 dense
        assert_eq!(pattern.nnz(), 9);
    }
}
