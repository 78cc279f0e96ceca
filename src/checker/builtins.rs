//! Return types of the builtin catalog
//!
//! The checker only needs to know what a builtin call produces; argument types
//! are not checked. Names are matched exactly, grouped by category.

use super::types::HypnoType;

/// Return type of a builtin, or `None` if the name is not a known builtin
pub fn builtin_return_type(name: &str) -> Option<HypnoType> {
    let ty = match name {
        // Math
        "Sin" | "Cos" | "Tan" | "Sqrt" | "Log" | "Log10" | "Abs" | "Floor" | "Ceil" | "Round"
        | "Min" | "Max" | "Pow" | "Factorial" | "Gcd" | "Lcm" | "Fibonacci" | "Clamp"
        | "Random" | "RandomRange" | "ToInt" | "ToDouble" | "HashString" | "HashNumber"
        | "SimpleRandom" | "Mean" | "Median" | "Mode" | "StandardDeviation" | "Variance"
        | "Range" | "Percentile" | "Correlation" | "GetCpuCount" | "GetFileSize" => HypnoType::Number,

        // String-producing
        "ToUpper" | "ToLower" | "Trim" | "Reverse" | "Capitalize" | "RemoveDuplicates"
        | "UniqueCharacters" | "ReverseWords" | "TitleCase" | "Replace" | "Substring"
        | "Repeat" | "PadLeft" | "PadRight" | "ToString" | "ArrayJoin" | "ReadFile"
        | "GetFileExtension" | "GetFileName" | "GetParentDirectory" | "GetCurrentDirectory"
        | "GetEnv" | "GetOperatingSystem" | "GetArchitecture" | "GetHostname"
        | "GetUsername" | "GetHomeDirectory" | "GetTempDirectory" => HypnoType::String,

        // Boolean-producing
        "IsPrime" | "IsEmpty" | "IsWhitespace" | "StartsWith" | "EndsWith" | "Contains"
        | "ArrayIsEmpty" | "ArrayContains" | "ToBoolean" | "FileExists" | "IsFile"
        | "IsDirectory" | "AreAnagrams" | "IsPalindrome" | "IsLeapYear" | "IsValidEmail"
        | "IsValidUrl" | "IsValidPhoneNumber" | "IsAlphanumeric" | "IsAlphabetic"
        | "IsNumeric" | "IsLowercase" | "IsUppercase" | "IsInRange" | "MatchesPattern" => {
            HypnoType::Boolean
        }

        // Array-producing
        "Split" | "ArrayReverse" | "ArraySort" | "ArrayTake" | "ArraySkip" | "ArraySlice"
        | "ArrayDistinct" | "ListDirectory" | "GetArgs" | "LinearRegression" => HypnoType::Array,

        // Array queries
        "Length" | "IndexOf" | "CountOccurrences" | "ArrayLength" | "ArrayIndexOf"
        | "ArraySum" | "ArrayAverage" | "ArrayMin" | "ArrayMax" | "ArrayCount" => HypnoType::Number,
        "ArrayGet" | "ArrayFirst" | "ArrayLast" => HypnoType::Any,

        // Void / hypnotic helpers
        "Observe" | "drift" | "Drift" | "DeepTrance" | "HypnoticCountdown"
        | "TranceInduction" | "HypnoticVisualization" | "WriteFile" | "AppendFile"
        | "DeleteFile" | "CreateDirectory" | "CopyFile" | "RenameFile" | "SetEnv" | "Exit" => {
            HypnoType::Void
        }

        // Date and time
        "CurrentTimestamp" | "DayOfWeek" | "DayOfYear" | "DaysInMonth" | "CurrentYear"
        | "CurrentMonth" | "CurrentDay" | "CurrentHour" | "CurrentMinute" | "CurrentSecond" => {
            HypnoType::Number
        }
        "CurrentDate" | "CurrentTime" | "CurrentDateTime" | "FormatDateTime" => HypnoType::String,

        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(builtin_return_type("Sqrt"), Some(HypnoType::Number));
        assert_eq!(builtin_return_type("ToUpper"), Some(HypnoType::String));
        assert_eq!(builtin_return_type("IsPrime"), Some(HypnoType::Boolean));
        assert_eq!(builtin_return_type("Split"), Some(HypnoType::Array));
        assert_eq!(builtin_return_type("Drift"), Some(HypnoType::Void));
        assert_eq!(builtin_return_type("CurrentDate"), Some(HypnoType::String));
        assert_eq!(builtin_return_type("CurrentYear"), Some(HypnoType::Number));
        assert_eq!(builtin_return_type("sqrt"), None);
    }
}
