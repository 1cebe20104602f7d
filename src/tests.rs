#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use itertools::Itertools;
    use ndarray::{arr2, Array2};

    use crate::assignment::{entropy, hungarian, Assignment, AssignmentStrategy};
    use crate::config::{ConfigError, SolverConfig};
    use crate::em;
    use crate::enumerate;
    use crate::equation::{Equation, ParseEquationError, SolutionMode};
    use crate::evidence::ScoreMatrix;
    use crate::multiset::Multiset;
    use crate::similarity::{lcs_length, LcsSimilarity, Similarity, SimilarityTable};
    use crate::term::Term;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect_vec()
    }

    fn naive_lcs(x: &[char], y: &[char]) -> usize {
        let mut table = Array2::<usize>::zeros((x.len() + 1, y.len() + 1));
        for i in 1..=x.len() {
            for j in 1..=y.len() {
                table[(i, j)] = if x[i - 1] == y[j - 1] {
                    table[(i - 1, j - 1)] + 1
                } else {
                    table[(i - 1, j)].max(table[(i, j - 1)])
                };
            }
        }
        table[(x.len(), y.len())]
    }

    fn matrix(rows: &str, cells: Array2<i64>) -> ScoreMatrix {
        ScoreMatrix { rows: chars(rows), cells }
    }

    fn no_em() -> SolverConfig {
        SolverConfig::builder().expectation_maximisation(false).build().unwrap()
    }

    #[test]
    fn lcs_short() {
        assert_eq!(LcsSimilarity.similarity("walk", "walked"), 4);
        assert_eq!(LcsSimilarity.similarity("abc", "abd"), 2);
        assert_eq!(LcsSimilarity.similarity("abc", "xbc"), 2);
        assert_eq!(LcsSimilarity.similarity("ab", "ba"), 1);
        assert_eq!(LcsSimilarity.similarity("", "abc"), 0);
        assert_eq!(LcsSimilarity.similarity("abc", ""), 0);
        assert_eq!(LcsSimilarity.similarity("été", "thé"), 2);
    }

    #[test]
    fn lcs_across_words() {
        // strings longer than one machine word on either side
        let x = chars(&"abcde".repeat(30));
        let y = chars(&"aebdcxe".repeat(25));
        assert_eq!(lcs_length(&x, &y), naive_lcs(&x, &y));
        assert_eq!(lcs_length(&y, &x), naive_lcs(&y, &x));

        let z = chars(&"ab".repeat(64));
        assert_eq!(lcs_length(&z, &z), 128);
        assert_eq!(lcs_length(&chars("ba"), &z), 2);
    }

    #[test]
    fn closure_similarity() {
        let constant = |_: &str, _: &str| 1usize;
        let table = SimilarityTable::new(&constant, "abc", "abd", "xbc");
        assert_eq!(table.get(Term::A, Term::B), 1);
        assert_eq!(table.get(Term::D, Term::B), 1);
    }

    #[test]
    fn derived_similarities() {
        let table = SimilarityTable::new(&LcsSimilarity, "walk", "walked", "talk");
        assert_eq!(table.get(Term::A, Term::B), 4);
        assert_eq!(table.get(Term::C, Term::A), 3);
        // s(D, B) = s(A, C) - |A| + |B|
        assert_eq!(table.get(Term::D, Term::B), 5);
        assert_eq!(table.get(Term::B, Term::D), 5);
        // s(D, C) = s(A, B) - |A| + |C|
        assert_eq!(table.get(Term::D, Term::C), 4);
        assert_eq!(table.get(Term::A, Term::D), 0);
    }

    #[test]
    fn multiset_arithmetic() {
        let target = Multiset::derive(&Multiset::of(&chars("walk")), &Multiset::of(&chars("walked")), &Multiset::of(&chars("talk")));
        assert_eq!(target.canonical(), chars("adeklt"));
        assert_eq!(target.len(), 6);
        assert!(target.is_non_negative());
        assert!(!target.contains('w'));

        let target = Multiset::derive(&Multiset::of(&chars("abz")), &Multiset::of(&chars("ab")), &Multiset::of(&chars("c")));
        assert_eq!(target.count('z'), -1);
        assert!(!target.is_non_negative());
        assert_eq!(target.canonical(), chars("c"));
        assert_eq!(target.counts().get(&'c'), Some(&1));
    }

    #[test]
    fn feasibility() {
        assert!(Equation::new("abc", "abd", "xbc").is_feasible());
        assert!(!Equation::new("abcd", "a", "b").is_feasible());
        assert!(!Equation::new("abz", "abc", "c").is_feasible());
        assert_eq!(Equation::new("abcd", "a", "b").len_d(), -2);
        assert_eq!(Equation::new("abc", "abd", "xbc").canonical(), "bdx");
    }

    #[test]
    fn banded_evidence() {
        let equation = Equation::new("abc", "abd", "xbc");
        let matrix = equation.score_matrix(&no_em()).unwrap();
        assert_eq!(matrix.rows(), chars("bdx").as_slice());
        assert_eq!(matrix.cells(), &arr2(&[[0i64, 4, 0], [0, 0, 3], [3, 0, 0]]));
    }

    #[test]
    fn banded_evidence_without_markers() {
        let config = SolverConfig::builder().expectation_maximisation(false).virtual_markers(false).build().unwrap();
        let matrix = Equation::new("abc", "abd", "xbc").score_matrix(&config).unwrap();
        assert_eq!(matrix.cells(), &arr2(&[[0i64, 4, 0], [0, 0, 2], [2, 0, 0]]));
    }

    #[test]
    fn walk_evidence() {
        let matrix = Equation::new("walk", "walked", "talk").score_matrix(&no_em()).unwrap();
        assert_eq!(matrix.rows(), chars("adeklt").as_slice());
        assert_eq!(matrix.cells(), &arr2(&[
            [0i64, 5, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 2],
            [0, 0, 0, 0, 3, 0],
            [0, 0, 0, 5, 0, 1],
            [0, 0, 5, 0, 0, 0],
            [3, 0, 0, 0, 0, 0],
        ]));
    }

    #[test]
    fn exhaustive_evidence_shifts_negatives() {
        let config = SolverConfig::builder()
            .diagonal_band(false)
            .virtual_markers(false)
            .expectation_maximisation(false)
            .build()
            .unwrap();
        // before shifting: a = [0, -1], b = [2, 2], c = [0, 1]
        let matrix = Equation::new("ab", "abc", "b").score_matrix(&config).unwrap();
        assert_eq!(matrix.rows(), chars("bc").as_slice());
        assert_eq!(matrix.cells(), &arr2(&[[3i64, 3], [1, 2]]));
    }

    #[test]
    fn exhaustive_evidence_with_markers() {
        let config = SolverConfig::builder().diagonal_band(false).expectation_maximisation(false).build().unwrap();
        let matrix = Equation::new("a", "ab", "a").score_matrix(&config).unwrap();
        assert_eq!(matrix.rows(), chars("ab").as_slice());
        assert_eq!(matrix.cells(), &arr2(&[[4i64, 1], [0, 3]]));
    }

    #[test]
    fn score_matrix_display() {
        let shown = matrix("ab", arr2(&[[0, 12], [3, 0]])).to_string();
        assert_eq!(shown, "   0  1\na  . 12\nb  3  .\n");
    }

    #[test]
    fn em_fixed_point() {
        let refined = em::refine(&matrix("ab", arr2(&[[0, 4], [7, 0]])), 1000);
        assert!(refined.converged);
        assert_eq!(refined.steps, 1);
        assert_eq!(refined.probabilities, arr2(&[[0.0, 1.0], [1.0, 0.0]]));

        let rescaled = em::rescale(&refined.probabilities, &chars("ab"));
        assert_eq!(rescaled.cells(), &arr2(&[[0i64, 20], [20, 0]]));
    }

    #[test]
    fn em_zeros() {
        let refined = em::refine(&matrix("ab", Array2::zeros((2, 2))), 1000);
        assert!(refined.converged);
        assert!(refined.probabilities.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn em_iteration_cap() {
        let scores = matrix("abc", arr2(&[[2, 1, 0], [0, 1, 0], [0, 0, 1]]));

        // the first step moves a cell by about 1/4, well above 1 / 3^2
        let refined = em::refine(&scores, 1);
        assert!(!refined.converged);
        assert_eq!(refined.steps, 1);
        assert!((refined.probabilities[(0, 1)] - 0.25).abs() < 1e-9);
        assert!((refined.probabilities[(1, 1)] - 0.75).abs() < 1e-9);

        let refined = em::refine(&scores, 1000);
        assert!(refined.converged);
        assert_eq!(refined.steps, 2);
        assert!(refined.probabilities[(1, 1)] > 0.75);
    }

    #[test]
    fn entropy_values() {
        assert_eq!(entropy(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(entropy(&[]), 0.0);
        assert_eq!(entropy(&[0.0, 5.0]), 0.0);
        assert!((entropy(&[1.0, 1.0]) - 1.0).abs() < 1e-12);
        assert!((entropy(&[3.0, 3.0, 3.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn hungarian_small() {
        let cost = arr2(&[[4, 1, 3], [2, 0, 5], [3, 2, 2]]);
        let assignment = hungarian(&cost);
        assert_eq!(assignment.pairs(), &[(0, 1), (1, 0), (2, 2)]);
        assert_eq!(assignment.total(&cost), 5);
    }

    #[test]
    fn hungarian_against_brute_force() {
        // linear congruential generator, deterministic across runs
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 20) as i64
        };

        for n in 1..=6 {
            let cost = Array2::from_shape_simple_fn((n, n), &mut next);
            let best = (0..n).permutations(n)
                .map(|cols| cols.iter().enumerate().map(|(row, col)| cost[(row, *col)]).sum::<i64>())
                .min()
                .unwrap();

            let assignment = hungarian(&cost);
            assert_eq!(assignment.total(&cost), best, "{cost}");
            assert_eq!(assignment.pairs().iter().map(|(_, col)| *col).sorted().collect_vec(), (0..n).collect_vec());
        }
    }

    #[test]
    fn hungarian_empty() {
        assert_eq!(hungarian(&Array2::zeros((0, 0))), Assignment::default());
    }

    #[test]
    fn greedy_unambiguous() {
        let scores = matrix("abc", arr2(&[[0, 9, 0], [0, 0, 4], [7, 0, 1]]));
        let greedy = AssignmentStrategy::Entropy.assign(&scores);
        let exact = AssignmentStrategy::Hungarian.assign(&scores);
        assert_eq!(greedy, exact);
        assert_eq!(enumerate::unique(&scores, &greedy), "cab");
    }

    #[test]
    fn greedy_repeated_characters() {
        // both rows of `a` are the same; the later one is placed first
        let scores = matrix("aab", arr2(&[[5, 1, 0], [5, 1, 0], [0, 0, 3]]));
        let greedy = AssignmentStrategy::Entropy.assign(&scores);
        assert_eq!(greedy.pairs().len(), 3);
        assert_eq!(greedy.pairs().iter().map(|(_, col)| *col).sorted().collect_vec(), vec![0, 1, 2]);
        assert_eq!(enumerate::unique(&scores, &greedy), "aab");
    }

    #[test]
    fn greedy_zero_matrix() {
        let scores = matrix("abc", Array2::zeros((3, 3)));
        let greedy = AssignmentStrategy::Entropy.assign(&scores);
        assert_eq!(greedy.pairs().iter().map(|(_, col)| *col).sorted().collect_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn enumerate_ties() {
        let target = Multiset::of(&chars("ab"));
        let scores = matrix("ab", arr2(&[[5, 5], [5, 5]]));
        let assignment = Assignment { pairs: vec![(0, 0), (1, 1)] };
        assert_eq!(enumerate::all(&scores, &assignment, &target), BTreeSet::from(["ab".to_owned(), "ba".to_owned()]));

        let target = Multiset::of(&chars("aab"));
        let scores = matrix("aab", Array2::from_elem((3, 3), 1));
        let assignment = Assignment { pairs: vec![(0, 0), (1, 1), (2, 2)] };
        assert_eq!(
            enumerate::all(&scores, &assignment, &target),
            BTreeSet::from(["aab".to_owned(), "aba".to_owned(), "baa".to_owned()])
        );
    }

    #[test]
    fn enumerate_no_ties() {
        let target = Multiset::of(&chars("ab"));
        let scores = matrix("ab", arr2(&[[1, 5], [5, 1]]));
        let assignment = Assignment { pairs: vec![(0, 1), (1, 0)] };
        assert_eq!(enumerate::admissible(&scores, &assignment), vec![BTreeSet::from(['b']), BTreeSet::from(['a'])]);
        assert_eq!(enumerate::all(&scores, &assignment, &target), BTreeSet::from(["ba".to_owned()]));
    }

    #[test]
    fn solve_scenarios() {
        init();
        let config = SolverConfig::default();

        let solutions = Equation::new("abc", "abd", "xbc").solve(&config, SolutionMode::All);
        assert_eq!(solutions.iter().collect_vec(), vec!["xbd"]);

        let solutions = Equation::new("walk", "walked", "talk").solve(&config, SolutionMode::All);
        assert_eq!(solutions.iter().collect_vec(), vec!["talked"]);

        let solutions = Equation::new("ab", "ba", "ab").solve(&config, SolutionMode::All);
        assert!(!solutions.is_empty());
        for d in solutions.iter() {
            assert_eq!(Multiset::of(&chars(d)), Multiset::of(&chars("ab")));
        }
    }

    #[test]
    fn solve_degenerate() {
        let config = SolverConfig::default();
        assert!(Equation::new("abcd", "a", "b").solve(&config, SolutionMode::All).is_empty());
        assert!(Equation::new("abz", "abc", "c").solve(&config, SolutionMode::All).is_empty());
        assert_eq!(Equation::new("abc", "ab", "c").solve(&config, SolutionMode::All).iter().collect_vec(), vec![""]);
        assert_eq!(Equation::new("", "", "").solve(&config, SolutionMode::Unique).iter().collect_vec(), vec![""]);
    }

    #[test]
    fn strategies_agree() {
        let hungarian = SolverConfig::default();
        let greedy = SolverConfig::builder().assignment(AssignmentStrategy::Entropy).build().unwrap();

        for (a, b, c) in [("abc", "abd", "xbc"), ("walk", "walked", "talk")] {
            assert_eq!(
                Equation::new(a, b, c).solve(&hungarian, SolutionMode::All),
                Equation::new(a, b, c).solve(&greedy, SolutionMode::All),
            );
        }
    }

    #[test]
    fn verification() {
        let solutions = Equation::new("walk", "walked", "talk").with_expected("talked").solve(&SolverConfig::default(), SolutionMode::All);
        assert_eq!(solutions.verified(), Some(true));

        let solutions = Equation::new("walk", "walked", "talk").with_expected("talks").solve(&SolverConfig::default(), SolutionMode::All);
        assert_eq!(solutions.verified(), Some(false));

        let solutions = Equation::new("walk", "walked", "talk").solve(&SolverConfig::default(), SolutionMode::All);
        assert_eq!(solutions.verified(), None);
    }

    #[test]
    fn config_builder() {
        assert_eq!(SolverConfig::builder().build(), Ok(SolverConfig::default()));
        assert_eq!(SolverConfig::builder().em_max_iterations(0).build(), Err(ConfigError::NoEmIterations));

        let config = SolverConfig::builder()
            .expectation_maximisation(false)
            .em_max_iterations(0)
            .assignment(AssignmentStrategy::Entropy)
            .build()
            .unwrap();
        assert!(!config.expectation_maximisation);
        assert_eq!(config.assignment, AssignmentStrategy::Entropy);
        assert!(config.virtual_markers && config.diagonal_band);
    }

    #[test]
    fn strategy_names() {
        assert_eq!("entropy".parse::<AssignmentStrategy>().unwrap(), AssignmentStrategy::Entropy);
        assert_eq!("hungarian".parse::<AssignmentStrategy>().unwrap(), AssignmentStrategy::Hungarian);
        assert_eq!(AssignmentStrategy::Entropy.to_string(), "entropy");
        assert!("simplex".parse::<AssignmentStrategy>().is_err());
    }

    #[test]
    fn notation() {
        let equation: Equation = "walk : walked :: talk : talked".parse().unwrap();
        assert_eq!(equation.expected(), Some("talked"));
        assert_eq!(equation.to_string(), "walk : walked :: talk : talked");

        let equation: Equation = "walk:walked::talk".parse().unwrap();
        assert_eq!(equation.expected(), None);
        assert_eq!(equation.to_string(), "walk : walked :: talk : None");

        let equation: Equation = "a : b :: c : None".parse().unwrap();
        assert_eq!(equation.expected(), None);

        assert_eq!("a : b : c".parse::<Equation>().unwrap_err(), ParseEquationError::Proportion(0));
        assert_eq!("a :: b :: c".parse::<Equation>().unwrap_err(), ParseEquationError::Proportion(2));
        assert_eq!("a : b : c :: d".parse::<Equation>().unwrap_err(), ParseEquationError::LeftRatio(3));
        assert_eq!("a : b :: c : d : e".parse::<Equation>().unwrap_err(), ParseEquationError::RightRatio(3));
    }

    #[test]
    fn solutions_display() {
        let config = SolverConfig::default();
        assert_eq!(Equation::new("abcd", "a", "b").solve(&config, SolutionMode::All).to_string(), "{}");
        assert_eq!(Equation::new("abc", "abd", "xbc").solve(&config, SolutionMode::All).to_string(), "xbd");

        let both = Equation::new("a", "a", "ab");
        let solutions = both.solve(&no_em(), SolutionMode::All);
        assert!(solutions.iter().all(|d| d.len() == 2));
    }
}
