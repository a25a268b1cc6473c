
use assertables::*;
use rstest::*;

use super::*;
